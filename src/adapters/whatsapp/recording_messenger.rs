//! Messaging gateway that records replies instead of sending them.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::ConversationId;
use crate::ports::{MessagingError, MessagingGateway};

/// Records every outbound message for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingMessenger {
    sent: Arc<Mutex<Vec<(ConversationId, String)>>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded message, in send order.
    pub fn sent(&self) -> Vec<(ConversationId, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Bodies sent to one conversation, in send order.
    pub fn texts_to(&self, to: &ConversationId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| id == to)
            .map(|(_, body)| body)
            .collect()
    }

    /// Most recent body sent to a conversation.
    pub fn last_text_to(&self, to: &ConversationId) -> Option<String> {
        self.texts_to(to).pop()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

#[async_trait]
impl MessagingGateway for RecordingMessenger {
    async fn send_text(&self, to: &ConversationId, body: &str) -> Result<(), MessagingError> {
        self.sent
            .lock()
            .map_err(|_| MessagingError::Network("recorder lock poisoned".to_string()))?
            .push((to.clone(), body.to_string()));
        Ok(())
    }
}
