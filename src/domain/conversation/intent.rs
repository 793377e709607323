//! Interpretations of free text returned by the assistant.

use std::fmt;

/// What the user is trying to do, when no flow step applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AdmissionFlow,
    AskFaq,
    /// Any other label the classifier produced.
    Other(String),
}

impl Intent {
    /// Parses a classifier label; matching is case-insensitive.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim().trim_matches(|c: char| c == '"' || c == '.');
        if trimmed.eq_ignore_ascii_case("AdmissionFlow") {
            Intent::AdmissionFlow
        } else if trimmed.eq_ignore_ascii_case("AskFAQ") {
            Intent::AskFaq
        } else {
            Intent::Other(trimmed.to_string())
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::AdmissionFlow => f.write_str("AdmissionFlow"),
            Intent::AskFaq => f.write_str("AskFAQ"),
            Intent::Other(label) => f.write_str(label),
        }
    }
}

/// Reply to a Yes/No question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
    Unclear,
}

impl YesNo {
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim().trim_end_matches('.');
        if trimmed.eq_ignore_ascii_case("yes") {
            YesNo::Yes
        } else if trimmed.eq_ignore_ascii_case("no") {
            YesNo::No
        } else {
            YesNo::Unclear
        }
    }
}

/// Outcome of validating one collected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    Valid,
    /// The assistant's correction message, relayed verbatim.
    Rejected(String),
}

impl ValidationVerdict {
    /// A reply is a rejection only when it ends with "please try again."
    /// and is not exactly "valid".
    pub fn from_reply(reply: &str) -> Self {
        let lowered = reply.trim().to_lowercase();
        if lowered == "valid" || !lowered.ends_with("please try again.") {
            ValidationVerdict::Valid
        } else {
            ValidationVerdict::Rejected(reply.trim().to_string())
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationVerdict::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_labels_match_case_insensitively() {
        assert_eq!(Intent::from_label("AdmissionFlow"), Intent::AdmissionFlow);
        assert_eq!(Intent::from_label(" admissionflow\n"), Intent::AdmissionFlow);
        assert_eq!(Intent::from_label("askfaq"), Intent::AskFaq);
        assert_eq!(Intent::from_label("\"AskFAQ\""), Intent::AskFaq);
    }

    #[test]
    fn unknown_intent_keeps_label() {
        assert_eq!(
            Intent::from_label("Greeting"),
            Intent::Other("Greeting".to_string())
        );
    }

    #[test]
    fn yes_no_parsing() {
        assert_eq!(YesNo::from_label("Yes"), YesNo::Yes);
        assert_eq!(YesNo::from_label("no."), YesNo::No);
        assert_eq!(YesNo::from_label("maybe"), YesNo::Unclear);
    }

    #[test]
    fn valid_reply_is_valid() {
        assert_eq!(ValidationVerdict::from_reply("VALID"), ValidationVerdict::Valid);
    }

    #[test]
    fn reply_not_ending_in_retry_phrase_is_valid() {
        assert!(ValidationVerdict::from_reply("Looks fine to me").is_valid());
    }

    #[test]
    fn retry_phrase_is_relayed() {
        let reply = "That does not look like an email. Please try again.";
        assert_eq!(
            ValidationVerdict::from_reply(reply),
            ValidationVerdict::Rejected(reply.to_string())
        );
    }
}
