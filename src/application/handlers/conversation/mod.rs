//! Conversation handlers.
//!
//! `InboundDispatcher` queues received texts per sender and feeds them, in
//! order, to `InboundMessageHandler`, which runs the `ConversationEngine`
//! under a per-conversation lock.

mod dispatcher;
mod engine;
mod error;
mod inbound;
mod locks;

pub use dispatcher::InboundDispatcher;
pub use engine::{ConversationEngine, ConversationPorts, EngineSettings, CANCEL_KEYWORD};
pub use error::ConversationError;
pub use inbound::{InboundMessageHandler, InboundOutcome};
pub use locks::ConversationLocks;
