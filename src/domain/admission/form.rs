//! The per-conversation field map collected by the admission flow.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::AdmissionId;

use super::field::AdmissionField;
use super::record::AdmissionRecord;

const NOT_PROVIDED: &str = "Not provided";

/// Values collected so far. Every field is optional until set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionForm {
    #[serde(rename = "displayname", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,
    /// Field picked at `admission_choose_detail_to_change`.
    #[serde(rename = "detailToUpdate", default, skip_serializing_if = "Option::is_none")]
    pub detail_to_update: Option<AdmissionField>,
    /// Set once the admission has been written (or when resuming one).
    #[serde(rename = "studentId", default, skip_serializing_if = "Option::is_none")]
    pub admission_id: Option<AdmissionId>,
    /// Last slot listing shown to the user.
    #[serde(rename = "slotsList", default, skip_serializing_if = "Option::is_none")]
    pub slots_list: Option<String>,
}

impl AdmissionForm {
    /// Seeds a form from a stored, not yet enrolled admission.
    pub fn from_record(record: &AdmissionRecord) -> Self {
        Self {
            display_name: Some(record.display_name.clone()),
            email: record.email.clone(),
            grade: Some(format!("Grade {}", record.grade)),
            semester: Some(format!("Semester {}", record.semester)),
            referral: Some(
                record
                    .referral
                    .clone()
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
            detail_to_update: None,
            admission_id: Some(record.id),
            slots_list: None,
        }
    }

    /// Current value of a field.
    pub fn get(&self, field: AdmissionField) -> Option<&str> {
        match field {
            AdmissionField::Name => self.display_name.as_deref(),
            AdmissionField::Email => self.email.as_deref(),
            AdmissionField::Grade => self.grade.as_deref(),
            AdmissionField::Semester => self.semester.as_deref(),
            AdmissionField::Referral => self.referral.as_deref(),
        }
    }

    /// Stores a value for a field, replacing any previous one.
    pub fn set(&mut self, field: AdmissionField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            AdmissionField::Name => self.display_name = value,
            AdmissionField::Email => self.email = value,
            AdmissionField::Grade => self.grade = value,
            AdmissionField::Semester => self.semester = value,
            AdmissionField::Referral => self.referral = value,
        }
    }

    /// Field value for display in the review prompt.
    pub fn display(&self, field: AdmissionField) -> &str {
        self.get(field).unwrap_or(NOT_PROVIDED)
    }

    /// True once every field has a value.
    pub fn is_complete(&self) -> bool {
        AdmissionField::ALL.iter().all(|f| self.get(*f).is_some())
    }

    /// Grade used for slot lookup, falling back to `default_grade`.
    pub fn grade_or<'a>(&'a self, default_grade: &'a str) -> &'a str {
        self.grade.as_deref().unwrap_or(default_grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    #[test]
    fn set_and_get_round_through_each_field() {
        let mut form = AdmissionForm::default();
        for field in AdmissionField::ALL {
            assert!(form.get(field).is_none());
            form.set(field, format!("value-{}", field));
        }
        assert_eq!(form.get(AdmissionField::Semester), Some("value-semester"));
        assert!(form.is_complete());
    }

    #[test]
    fn display_falls_back_to_not_provided() {
        let form = AdmissionForm::default();
        assert_eq!(form.display(AdmissionField::Email), "Not provided");
    }

    #[test]
    fn from_record_formats_grade_and_semester() {
        let record = AdmissionRecord {
            id: AdmissionId::new(9),
            display_name: "Omar".to_string(),
            grade: 5,
            semester: 1,
            referral: None,
            registered_at: Timestamp::now(),
            enrolled: false,
            email: Some("omar@example.com".to_string()),
            mobile: "971500000000".to_string(),
            mobile2: None,
        };
        let form = AdmissionForm::from_record(&record);
        assert_eq!(form.grade.as_deref(), Some("Grade 5"));
        assert_eq!(form.semester.as_deref(), Some("Semester 1"));
        assert_eq!(form.referral.as_deref(), Some("Unknown"));
        assert_eq!(form.admission_id, Some(AdmissionId::new(9)));
    }

    #[test]
    fn serialized_form_uses_session_keys() {
        let form = AdmissionForm {
            display_name: Some("Lina".to_string()),
            admission_id: Some(AdmissionId::new(4)),
            ..Default::default()
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["displayname"], "Lina");
        assert_eq!(json["studentId"], 4);
        assert!(json.get("email").is_none());
    }

    #[test]
    fn grade_or_uses_default_when_missing() {
        let form = AdmissionForm::default();
        assert_eq!(form.grade_or("Grade 4"), "Grade 4");
    }
}
