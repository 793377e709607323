//! Inbound chat messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, MessageId, Timestamp};

/// A text message received from a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub body: String,
    /// When the sender's device sent it.
    pub sent_at: Timestamp,
}

impl InboundMessage {
    pub fn new(conversation_id: ConversationId, body: impl Into<String>, sent_at: Timestamp) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            body: body.into(),
            sent_at,
        }
    }

    /// Same message with a replaced body (after sanitizing).
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// True when the message was sent before `started_at`.
    pub fn is_stale(&self, started_at: Timestamp) -> bool {
        self.sent_at.is_before(&started_at)
    }
}
