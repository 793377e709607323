//! In-memory adapters for the persistence ports.
//!
//! Used by tests and local runs without a database. Each adapter is
//! `Clone` and shares its state, so a test can keep a handle for
//! assertions while the engine holds another.

mod admission_repository;
mod appointment_repository;
mod contact_directory;
mod message_log;

pub use admission_repository::InMemoryAdmissionRepository;
pub use appointment_repository::InMemoryAppointmentRepository;
pub use contact_directory::InMemoryContactDirectory;
pub use message_log::InMemoryMessageLog;
