//! In-Memory Session Store Adapter
//!
//! Stores sessions in memory. Used by tests and single-instance
//! deployments without Redis.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::Session;
use crate::domain::foundation::{ConversationId, Timestamp};
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory storage for conversation sessions.
///
/// With a TTL set, a session whose `updated_at` is older than the TTL
/// reads as absent and is evicted on that read.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<ConversationId, Session>>>,
    ttl_secs: Option<u64>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions idle for longer than `ttl_secs` expire.
    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            ttl_secs: Some(ttl_secs),
            ..Self::default()
        }
    }

    /// Number of stored sessions (expired ones included until read).
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_expired(&self, session: &Session, now: Timestamp) -> bool {
        match self.ttl_secs {
            Some(ttl) => session.updated_at.plus_secs(ttl).is_before(&now),
            None => false,
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &ConversationId) -> Result<Option<Session>, SessionStoreError> {
        let now = Timestamp::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get(id) {
            Some(session) if self.is_expired(session, now) => {
                sessions.remove(id);
                Ok(None)
            }
            Some(session) => Ok(Some(session.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, id: &ConversationId, session: &Session) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .insert(id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, id: &ConversationId) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}
