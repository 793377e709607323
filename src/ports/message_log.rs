//! Message log port - audit trail of inbound messages.

use async_trait::async_trait;

use crate::domain::conversation::InboundMessage;
use crate::domain::foundation::{DomainError, Timestamp};

/// Append-only store of received messages.
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Record a sanitized inbound message as received at `received_at`.
    async fn record(&self, message: &InboundMessage, received_at: Timestamp)
        -> Result<(), DomainError>;
}
