//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `AdmissionRepository` - Admissions and their contact rows
//! - `AppointmentRepository` - Meeting bookings
//! - `ContactDirectory` - Identity lookup by phone number
//! - `MessageLog` - Audit trail of inbound messages
//! - `SessionStore` - Per-conversation session state
//!
//! ## External Service Ports
//!
//! - `AIProvider` - Chat completion service
//! - `AdmissionAssistant` - Intent, validation, yes/no and FAQ answers
//! - `MessagingGateway` - Outbound chat replies
//! - `RateLimiter` - Per-sender throttling

mod admission_repository;
mod ai_provider;
mod appointment_repository;
mod assistant;
mod contact_directory;
mod message_log;
mod messaging;
mod rate_limiter;
mod session_store;

pub use admission_repository::AdmissionRepository;
pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use appointment_repository::AppointmentRepository;
pub use assistant::AdmissionAssistant;
pub use contact_directory::ContactDirectory;
pub use message_log::MessageLog;
pub use messaging::{MessagingError, MessagingGateway};
pub use rate_limiter::{
    window_start, RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult,
    RateLimitScope, RateLimiter,
};
pub use session_store::{SessionStore, SessionStoreError};
