//! Conversation behaviour settings

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::admission::grade_number;

use super::error::ValidationError;

/// FAQ source, throttling and defaults
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Path of the FAQ text answered from
    #[serde(default = "default_faq_path")]
    pub faq_path: PathBuf,

    /// Messages one sender may send per minute
    #[serde(default = "default_messages_per_minute")]
    pub messages_per_minute: u32,

    /// Messages from all senders together per minute
    #[serde(default = "default_global_messages_per_minute")]
    pub global_messages_per_minute: u32,

    /// Grade assumed for slot lookup when the form has none
    #[serde(default = "default_grade")]
    pub default_grade: String,
}

impl BotConfig {
    /// Validate bot configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.messages_per_minute == 0 || self.global_messages_per_minute == 0 {
            return Err(ValidationError::InvalidRateLimit);
        }
        if grade_number(&self.default_grade).is_none() {
            return Err(ValidationError::InvalidDefaultGrade(self.default_grade.clone()));
        }
        Ok(())
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            faq_path: default_faq_path(),
            messages_per_minute: default_messages_per_minute(),
            global_messages_per_minute: default_global_messages_per_minute(),
            default_grade: default_grade(),
        }
    }
}

fn default_faq_path() -> PathBuf {
    PathBuf::from("faq.txt")
}

fn default_messages_per_minute() -> u32 {
    10
}

fn default_global_messages_per_minute() -> u32 {
    1_000
}

fn default_grade() -> String {
    "Grade 4".to_string()
}
