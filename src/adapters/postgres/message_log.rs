//! PostgreSQL implementation of MessageLog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::conversation::InboundMessage;
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::MessageLog;

/// Appends inbound messages to `user_message`.
#[derive(Clone)]
pub struct PostgresMessageLog {
    pool: PgPool,
}

impl PostgresMessageLog {
    /// Creates a new PostgresMessageLog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageLog for PostgresMessageLog {
    async fn record(
        &self,
        message: &InboundMessage,
        received_at: Timestamp,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_message (id, sender, body, sent_at, received_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.conversation_id.phone())
        .bind(&message.body)
        .bind(message.sent_at.as_datetime())
        .bind(received_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert user message", e))?;

        Ok(())
    }
}
