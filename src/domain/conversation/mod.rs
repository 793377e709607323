//! Conversation domain module.
//!
//! Per-conversation session state, the state machine that governs it, and
//! the texts sent back to the user.
//!
//! # Module Structure
//!
//! - `state` - Conversation states and legal transitions
//! - `session` - Stored session (state, collected form, detour return point)
//! - `intent` - Parsed assistant replies (intent, yes/no, field verdict)
//! - `prompts` - Fixed replies and per-state prompts
//! - `sanitizer` - Inbound text cleaning
//! - `faq` - Static FAQ document
//! - `message` - Inbound message type

mod faq;
mod intent;
mod message;
pub mod prompts;
mod sanitizer;
mod session;
mod state;

pub use faq::FaqDocument;
pub use intent::{Intent, ValidationVerdict, YesNo};
pub use message::InboundMessage;
pub use sanitizer::{InboundSanitizer, MAX_MESSAGE_CHARS};
pub use session::Session;
pub use state::ConversationState;
