//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresAdmissionRepository` - Admissions and their contact rows
//! - `PostgresAppointmentRepository` - Meeting bookings with conflict-safe inserts
//! - `PostgresContactDirectory` - Guardian / student lookup by phone
//! - `PostgresMessageLog` - Inbound message audit trail

mod admission_repository;
mod appointment_repository;
mod contact_directory;
mod message_log;

pub use admission_repository::PostgresAdmissionRepository;
pub use appointment_repository::PostgresAppointmentRepository;
pub use contact_directory::PostgresContactDirectory;
pub use message_log::PostgresMessageLog;
