//! Per-conversation serialization of inbound messages.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::ConversationId;

/// One async mutex per conversation.
///
/// Messages from the same sender are handled one at a time; different
/// senders never wait on each other.
#[derive(Debug, Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<Mutex<HashMap<ConversationId, Arc<Mutex<()>>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to a conversation.
    pub async fn acquire(&self, id: &ConversationId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Drop entries nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn id(phone: &str) -> ConversationId {
        ConversationId::new(phone).unwrap()
    }

    #[tokio::test]
    async fn same_conversation_is_serialized() {
        let locks = ConversationLocks::new();
        let guard = locks.acquire(&id("1")).await;

        let waiting = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&id("1")).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_conversations_do_not_block() {
        let locks = ConversationLocks::new();
        let _a = locks.acquire(&id("1")).await;

        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&id("2"))).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = ConversationLocks::new();
        drop(locks.acquire(&id("1")).await);
        drop(locks.acquire(&id("2")).await);
        assert_eq!(locks.locks.lock().await.len(), 1);
    }
}
