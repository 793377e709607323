//! InboundDispatcher - per-sender FIFO queues in front of the handler.
//!
//! The webhook hands every message here in the order it arrived. Each
//! conversation gets one queue and one worker task that drains it, so a
//! sender's messages are processed strictly one after another while
//! different senders run concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::domain::conversation::InboundMessage;
use crate::domain::foundation::ConversationId;

use super::inbound::{InboundMessageHandler, InboundOutcome};

type Queues = Arc<Mutex<HashMap<ConversationId, UnboundedSender<InboundMessage>>>>;

/// Routes inbound messages to one ordered worker per conversation.
#[derive(Clone)]
pub struct InboundDispatcher {
    inbound: Arc<InboundMessageHandler>,
    queues: Queues,
}

impl InboundDispatcher {
    pub fn new(inbound: Arc<InboundMessageHandler>) -> Self {
        Self {
            inbound,
            queues: Arc::default(),
        }
    }

    /// Queues `message` behind any earlier ones from the same sender.
    ///
    /// Does not wait: call it in arrival order and return.
    pub fn dispatch(&self, message: InboundMessage) {
        let id = message.conversation_id.clone();
        let mut queues = lock(&self.queues);

        let message = match queues.get(&id) {
            Some(queue) => match queue.send(message) {
                Ok(()) => return,
                // The worker stopped without clearing its entry; start a new one.
                Err(mpsc::error::SendError(message)) => message,
            },
            None => message,
        };

        let (queue, pending) = mpsc::unbounded_channel();
        if queue.send(message).is_err() {
            return;
        }
        queues.insert(id.clone(), queue);
        drop(queues);

        tokio::spawn(drain(self.inbound.clone(), self.queues.clone(), id, pending));
    }

    /// Conversations with a running worker.
    pub fn active_conversations(&self) -> usize {
        lock(&self.queues).len()
    }
}

/// Handles queued messages until the queue is empty, then retires.
///
/// The entry is removed under the map lock after a final empty check, so a
/// message dispatched concurrently either lands in this queue before the
/// check or finds no entry and starts a fresh worker.
async fn drain(
    inbound: Arc<InboundMessageHandler>,
    queues: Queues,
    id: ConversationId,
    mut pending: UnboundedReceiver<InboundMessage>,
) {
    loop {
        let next = match pending.try_recv() {
            Ok(message) => Some(message),
            Err(_) => {
                let mut queues = lock(&queues);
                match pending.try_recv() {
                    Ok(message) => Some(message),
                    Err(_) => {
                        queues.remove(&id);
                        None
                    }
                }
            }
        };

        let Some(message) = next else {
            tracing::trace!(conversation_id = %id, "Conversation queue drained");
            return;
        };
        process(&inbound, message).await;
    }
}

async fn process(inbound: &InboundMessageHandler, message: InboundMessage) {
    let conversation_id = message.conversation_id.clone();
    match inbound.handle(message).await {
        Ok(InboundOutcome::Handled) => {}
        Ok(outcome) => {
            tracing::debug!(conversation_id = %conversation_id, ?outcome, "Message not processed");
        }
        Err(e) => {
            tracing::error!(
                conversation_id = %conversation_id,
                kind = e.kind(),
                error = %e,
                "Failed to handle inbound message"
            );
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
