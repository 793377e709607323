//! Messaging Gateway Port - Interface for sending chat replies.

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;

/// Port for delivering text replies to a conversation.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, to: &ConversationId, body: &str) -> Result<(), MessagingError>;
}

/// Messaging gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// The messaging API rejected the request.
    #[error("send rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status returned by the API.
        status: u16,
        /// Error body or summary.
        message: String,
    },

    /// Access token missing or refused.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,
}

impl MessagingError {
    /// Creates a rejected error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Returns true if sending again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            MessagingError::Network(_) | MessagingError::Timeout => true,
            MessagingError::Rejected { status, .. } => *status == 429 || *status >= 500,
            MessagingError::AuthenticationFailed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messaging_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn MessagingGateway) {}
    }

    #[test]
    fn server_errors_and_throttling_are_retryable() {
        assert!(MessagingError::rejected(503, "unavailable").is_retryable());
        assert!(MessagingError::rejected(429, "slow down").is_retryable());
        assert!(MessagingError::Timeout.is_retryable());
        assert!(!MessagingError::rejected(400, "bad number").is_retryable());
        assert!(!MessagingError::AuthenticationFailed.is_retryable());
    }

    #[test]
    fn rejected_displays_status() {
        let err = MessagingError::rejected(400, "invalid recipient");
        assert_eq!(err.to_string(), "send rejected with status 400: invalid recipient");
    }
}
