//! Admission form fields and their validation types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user-editable field of the admission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionField {
    Name,
    Email,
    Grade,
    Semester,
    Referral,
}

impl AdmissionField {
    /// All editable fields in collection order.
    pub const ALL: [AdmissionField; 5] = [
        AdmissionField::Name,
        AdmissionField::Email,
        AdmissionField::Grade,
        AdmissionField::Semester,
        AdmissionField::Referral,
    ];

    /// Parses the user's reply when asked which detail to change.
    ///
    /// Accepts the lower-case field keyword only, surrounding whitespace ignored.
    pub fn parse_choice(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "name" => Some(AdmissionField::Name),
            "email" => Some(AdmissionField::Email),
            "grade" => Some(AdmissionField::Grade),
            "semester" => Some(AdmissionField::Semester),
            "referral" => Some(AdmissionField::Referral),
            _ => None,
        }
    }

    /// Lower-case keyword, as typed by the user.
    pub fn keyword(&self) -> &'static str {
        match self {
            AdmissionField::Name => "name",
            AdmissionField::Email => "email",
            AdmissionField::Grade => "grade",
            AdmissionField::Semester => "semester",
            AdmissionField::Referral => "referral",
        }
    }

    /// Capitalized label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            AdmissionField::Name => "Name",
            AdmissionField::Email => "Email",
            AdmissionField::Grade => "Grade",
            AdmissionField::Semester => "Semester",
            AdmissionField::Referral => "Referral",
        }
    }

    /// Validation type sent to the assistant for this field.
    pub fn validation_type(&self) -> ValidationType {
        match self {
            AdmissionField::Name => ValidationType::Name,
            AdmissionField::Email => ValidationType::Email,
            AdmissionField::Grade => ValidationType::GradeLevel,
            AdmissionField::Semester => ValidationType::Semester,
            AdmissionField::Referral => ValidationType::ReferralSource,
        }
    }
}

impl fmt::Display for AdmissionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Semantic validation category understood by the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationType {
    Name,
    Email,
    GradeLevel,
    Semester,
    ReferralSource,
}

impl ValidationType {
    /// Wire name used in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationType::Name => "name",
            ValidationType::Email => "email",
            ValidationType::GradeLevel => "grade_level",
            ValidationType::Semester => "semester",
            ValidationType::ReferralSource => "referral_source",
        }
    }

    /// Session storage key the validated value lands under.
    pub fn store_key(&self) -> &'static str {
        match self {
            ValidationType::Name => "displayname",
            ValidationType::Email => "email",
            ValidationType::GradeLevel => "grade",
            ValidationType::Semester => "semester",
            ValidationType::ReferralSource => "referral",
        }
    }

    /// Form field populated by a value of this type.
    pub fn field(&self) -> AdmissionField {
        match self {
            ValidationType::Name => AdmissionField::Name,
            ValidationType::Email => AdmissionField::Email,
            ValidationType::GradeLevel => AdmissionField::Grade,
            ValidationType::Semester => AdmissionField::Semester,
            ValidationType::ReferralSource => AdmissionField::Referral,
        }
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_choice_accepts_keywords_case_insensitively() {
        assert_eq!(AdmissionField::parse_choice("Name"), Some(AdmissionField::Name));
        assert_eq!(AdmissionField::parse_choice("  EMAIL "), Some(AdmissionField::Email));
        assert_eq!(AdmissionField::parse_choice("referral"), Some(AdmissionField::Referral));
    }

    #[test]
    fn parse_choice_rejects_other_words() {
        assert_eq!(AdmissionField::parse_choice("phone"), None);
        assert_eq!(AdmissionField::parse_choice("my name"), None);
        assert_eq!(AdmissionField::parse_choice(""), None);
    }

    #[test]
    fn store_keys_follow_fixed_mapping() {
        assert_eq!(ValidationType::Name.store_key(), "displayname");
        assert_eq!(ValidationType::Email.store_key(), "email");
        assert_eq!(ValidationType::GradeLevel.store_key(), "grade");
        assert_eq!(ValidationType::Semester.store_key(), "semester");
        assert_eq!(ValidationType::ReferralSource.store_key(), "referral");
    }

    #[test]
    fn validation_type_and_field_are_inverse() {
        for field in AdmissionField::ALL {
            assert_eq!(field.validation_type().field(), field);
        }
    }

    #[test]
    fn validation_type_serializes_snake_case() {
        let json = serde_json::to_string(&ValidationType::ReferralSource).unwrap();
        assert_eq!(json, "\"referral_source\"");
    }
}
