//! Admission Assistant Port - the four AI-backed judgements the
//! conversation flow relies on.
//!
//! Kept separate from `AIProvider` so the engine depends on parsed
//! answers rather than prompt text.

use async_trait::async_trait;

use crate::domain::admission::ValidationType;
use crate::domain::conversation::{ConversationState, FaqDocument, Intent, ValidationVerdict, YesNo};

use super::AIError;

/// AI-backed interpretation of user text.
#[async_trait]
pub trait AdmissionAssistant: Send + Sync {
    /// Classify what the user wants, given where the conversation is.
    async fn determine_intent(
        &self,
        text: &str,
        current_state: Option<ConversationState>,
    ) -> Result<Intent, AIError>;

    /// Check a collected field value.
    async fn validate_input(
        &self,
        validation_type: ValidationType,
        text: &str,
    ) -> Result<ValidationVerdict, AIError>;

    /// Interpret a reply to a Yes/No question.
    async fn interpret_yes_no(&self, text: &str) -> Result<YesNo, AIError>;

    /// Answer a free-form question from the FAQ document.
    ///
    /// Returns `None` when the model produced an empty answer.
    async fn answer_question(
        &self,
        text: &str,
        document: &FaqDocument,
    ) -> Result<Option<String>, AIError>;
}
