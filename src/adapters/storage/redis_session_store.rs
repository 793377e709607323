//! Redis Session Store Adapter
//!
//! Sessions are stored as JSON under `session:<conversation id>` with an
//! expiry, so idle conversations are dropped by Redis itself.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::conversation::Session;
use crate::domain::foundation::ConversationId;
use crate::ports::{SessionStore, SessionStoreError};

const KEY_PREFIX: &str = "session:";

/// Redis-backed session store.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }

    fn key(id: &ConversationId) -> String {
        format!("{}{}", KEY_PREFIX, id.as_str())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, id: &ConversationId) -> Result<Option<Session>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(Self::key(id))
            .await
            .map_err(|e: redis::RedisError| SessionStoreError::Unavailable(e.to_string()))?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    conversation_id = %id,
                    error = %e,
                    "Discarding unreadable session"
                );
                Ok(None)
            }
        }
    }

    async fn set(&self, id: &ConversationId, session: &Session) -> Result<(), SessionStoreError> {
        let json = serde_json::to_string(session)
            .map_err(|e| SessionStoreError::SerializationFailed(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(id), json, self.ttl_secs)
            .await
            .map_err(|e: redis::RedisError| SessionStoreError::Unavailable(e.to_string()))
    }

    async fn delete(&self, id: &ConversationId) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(id))
            .await
            .map_err(|e: redis::RedisError| SessionStoreError::Unavailable(e.to_string()))
    }
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_session_prefix() {
        let id = ConversationId::new("971500000000@c.us").unwrap();
        assert_eq!(RedisSessionStore::key(&id), "session:971500000000@c.us");
    }
}
