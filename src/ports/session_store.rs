//! Session Store Port - Interface for persisting per-conversation sessions.
//!
//! A session is present only while a flow is active. Implementations may
//! expire sessions after a TTL; an expired session reads as absent.

use async_trait::async_trait;

use crate::domain::conversation::Session;
use crate::domain::foundation::ConversationId;

/// Errors that can occur during session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Failed to serialize session: {0}")]
    SerializationFailed(String),

    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Port for loading and saving conversation sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session for a conversation.
    ///
    /// Returns `None` if there is no session, it expired, or the stored
    /// value no longer deserializes.
    async fn get(&self, id: &ConversationId) -> Result<Option<Session>, SessionStoreError>;

    /// Save (create or replace) the session for a conversation.
    async fn set(&self, id: &ConversationId, session: &Session) -> Result<(), SessionStoreError>;

    /// Drop the session for a conversation. Deleting a missing session is not an error.
    async fn delete(&self, id: &ConversationId) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = SessionStoreError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Session store unavailable: connection refused");
    }
}
