//! In-memory message log.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::InboundMessage;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::MessageLog;

/// Keeps every recorded message for assertions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageLog {
    entries: Arc<RwLock<Vec<(InboundMessage, Timestamp)>>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded messages, oldest first.
    pub async fn messages(&self) -> Vec<InboundMessage> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn record(
        &self,
        message: &InboundMessage,
        received_at: Timestamp,
    ) -> Result<(), DomainError> {
        self.entries
            .write()
            .await
            .push((message.clone(), received_at));
        Ok(())
    }
}
