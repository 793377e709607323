//! Appointment repository port.

use async_trait::async_trait;

use crate::domain::foundation::{AdmissionId, DomainError, Timestamp};
use crate::domain::scheduling::{Appointment, BookingOutcome};

/// Repository port for admission meetings.
///
/// Implementations must enforce at most one appointment per admission and
/// at most one appointment per slot per grade.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Existing appointment for an admission, if any.
    async fn find_by_admission(&self, id: AdmissionId)
        -> Result<Option<Appointment>, DomainError>;

    /// Start times already booked for `grade` within `[from, to)`.
    async fn booked_between(
        &self,
        grade: i16,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Timestamp>, DomainError>;

    /// Book the appointment with a single conditional write.
    ///
    /// Losing either uniqueness race is reported through the outcome, not
    /// as an error.
    async fn reserve(&self, appointment: &Appointment) -> Result<BookingOutcome, DomainError>;
}
