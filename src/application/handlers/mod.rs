//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod admission;
pub mod conversation;
pub mod scheduling;

pub use admission::{
    CancelAdmissionCommand, CancelAdmissionHandler, SubmitAdmissionCommand,
    SubmitAdmissionHandler, SubmitAdmissionResult,
};
pub use conversation::{
    ConversationEngine, ConversationError, ConversationLocks, ConversationPorts, EngineSettings,
    InboundDispatcher, InboundMessageHandler, InboundOutcome,
};
pub use scheduling::{
    AvailableSlotsHandler, AvailableSlotsQuery, BookAppointmentCommand, BookAppointmentHandler,
};
