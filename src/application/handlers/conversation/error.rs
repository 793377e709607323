//! Errors surfaced by the conversation engine.

use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::ports::{AIError, MessagingError, SessionStoreError};

/// Failures that abort handling of one inbound message.
///
/// Validation problems never appear here; they are answered with a
/// re-prompt. Store write failures on submission or booking are answered
/// with an apology and do not surface either.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("assistant call failed: {0}")]
    Assistant(#[from] AIError),

    #[error("session store failed: {0}")]
    SessionStore(#[from] SessionStoreError),

    #[error("reply could not be sent: {0}")]
    Messaging(#[from] MessagingError),

    #[error("domain operation failed: {0}")]
    Domain(#[from] DomainError),
}

impl ConversationError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ConversationError::Assistant(_) => "assistant",
            ConversationError::SessionStore(_) => "session_store",
            ConversationError::Messaging(_) => "messaging",
            ConversationError::Domain(_) => "domain",
        }
    }
}
