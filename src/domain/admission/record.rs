//! Durable admission records and the identity lookup result.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{AdmissionId, Timestamp, ValidationError};

use super::form::AdmissionForm;
use super::normalize::{grade_number, semester_number};

/// An admission as stored in the `student` table, joined with its contact row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRecord {
    pub id: AdmissionId,
    pub display_name: String,
    pub grade: i16,
    pub semester: i16,
    pub referral: Option<String>,
    pub registered_at: Timestamp,
    pub enrolled: bool,
    pub email: Option<String>,
    pub mobile: String,
    /// Second guardian number, set by the admissions office.
    #[serde(default)]
    pub mobile2: Option<String>,
}

impl AdmissionRecord {
    /// Pending records can still be edited, resumed or cancelled.
    pub fn is_pending(&self) -> bool {
        !self.enrolled
    }

    /// Whether `phone` is either of the record's contact numbers.
    pub fn has_phone(&self, phone: &str) -> bool {
        self.mobile == phone || self.mobile2.as_deref() == Some(phone)
    }
}

/// Insert/update payload for an admission and its contact row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmission {
    pub display_name: String,
    pub email: String,
    pub grade: i16,
    pub semester: i16,
    pub referral: Option<String>,
    pub mobile: String,
}

impl NewAdmission {
    /// Builds the payload from a collected form and the sender's phone number.
    pub fn from_form(form: &AdmissionForm, mobile: &str) -> Result<Self, ValidationError> {
        let display_name = form
            .display_name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ValidationError::empty_field("display_name"))?;
        let email = form
            .email
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ValidationError::empty_field("email"))?;
        let grade = form
            .grade
            .as_deref()
            .ok_or_else(|| ValidationError::empty_field("grade"))
            .and_then(|g| {
                grade_number(g)
                    .ok_or_else(|| ValidationError::invalid_format("grade", "no grade number"))
            })?;
        let semester = form
            .semester
            .as_deref()
            .ok_or_else(|| ValidationError::empty_field("semester"))
            .and_then(|s| {
                semester_number(s)
                    .ok_or_else(|| ValidationError::invalid_format("semester", "no semester number"))
            })?;

        Ok(Self {
            display_name,
            email,
            grade,
            semester,
            referral: form.referral.clone(),
            mobile: mobile.to_string(),
        })
    }
}

/// Who a phone number belongs to, as far as the school records know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactRole {
    Parent,
    Student,
}

impl fmt::Display for ContactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactRole::Parent => f.write_str("parent"),
            ContactRole::Student => f.write_str("student"),
        }
    }
}

/// A guardian or student row matched by phone number.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownContact {
    pub role: ContactRole,
    /// The matched row, column by column.
    pub details: serde_json::Value,
}

impl KnownContact {
    /// Message disclosing the matched record back to its owner.
    pub fn disclosure(&self) -> String {
        let details = serde_json::to_string_pretty(&self.details)
            .unwrap_or_else(|_| self.details.to_string());
        format!("We found your info as a {}:\n{}", self.role, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_form() -> AdmissionForm {
        AdmissionForm {
            display_name: Some("Sara Ahmed".to_string()),
            email: Some("sara@example.com".to_string()),
            grade: Some("Grade 7".to_string()),
            semester: Some("Semester 2".to_string()),
            referral: Some("Instagram".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn new_admission_extracts_numbers_from_form() {
        let admission = NewAdmission::from_form(&complete_form(), "971500000000").unwrap();
        assert_eq!(admission.grade, 7);
        assert_eq!(admission.semester, 2);
        assert_eq!(admission.mobile, "971500000000");
        assert_eq!(admission.referral.as_deref(), Some("Instagram"));
    }

    #[test]
    fn new_admission_requires_name_and_email() {
        let mut form = complete_form();
        form.email = None;
        assert_eq!(
            NewAdmission::from_form(&form, "1"),
            Err(ValidationError::empty_field("email"))
        );
    }

    #[test]
    fn new_admission_rejects_grade_without_number() {
        let mut form = complete_form();
        form.grade = Some("Kindergarten".to_string());
        assert!(NewAdmission::from_form(&form, "1").is_err());
    }

    #[test]
    fn disclosure_names_role_and_fields() {
        let contact = KnownContact {
            role: ContactRole::Parent,
            details: json!({"id": 3, "mobile": "971500000000"}),
        };
        let text = contact.disclosure();
        assert!(text.starts_with("We found your info as a parent:\n"));
        assert!(text.contains("\"mobile\": \"971500000000\""));
    }
}
