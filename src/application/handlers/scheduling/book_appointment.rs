//! BookAppointmentHandler - Command handler for reserving a meeting slot.

use std::sync::Arc;

use crate::domain::foundation::{AdmissionId, DomainError, Timestamp};
use crate::domain::scheduling::{Appointment, BookingOutcome};
use crate::ports::AppointmentRepository;

/// Command to book an admission inquiry meeting.
#[derive(Debug, Clone, Copy)]
pub struct BookAppointmentCommand {
    pub admission_id: AdmissionId,
    pub grade: i16,
    pub slot: Timestamp,
}

/// Handler for booking meetings.
///
/// Checks for an existing appointment first, then relies on the
/// repository's conditional write for races.
pub struct BookAppointmentHandler {
    appointments: Arc<dyn AppointmentRepository>,
}

impl BookAppointmentHandler {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    pub async fn handle(&self, cmd: BookAppointmentCommand) -> Result<BookingOutcome, DomainError> {
        if let Some(existing) = self.appointments.find_by_admission(cmd.admission_id).await? {
            return Ok(BookingOutcome::AlreadyBooked(existing));
        }

        let appointment = Appointment::admission_inquiry(cmd.admission_id, cmd.grade, cmd.slot);
        let outcome = self.appointments.reserve(&appointment).await?;

        match &outcome {
            BookingOutcome::Booked(_) => {
                tracing::info!(admission_id = %cmd.admission_id, grade = cmd.grade, "Meeting booked")
            }
            BookingOutcome::SlotTaken => {
                tracing::info!(admission_id = %cmd.admission_id, "Slot taken before booking")
            }
            BookingOutcome::AlreadyBooked(_) => {
                tracing::info!(admission_id = %cmd.admission_id, "Admission already has a meeting")
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::in_memory::InMemoryAppointmentRepository;

    fn command(admission: i64, secs: u64) -> BookAppointmentCommand {
        BookAppointmentCommand {
            admission_id: AdmissionId::new(admission),
            grade: 4,
            slot: Timestamp::from_unix_secs(secs),
        }
    }

    #[tokio::test]
    async fn books_free_slot() {
        let repo = InMemoryAppointmentRepository::new();
        let handler = BookAppointmentHandler::new(Arc::new(repo.clone()));

        let outcome = handler.handle(command(1, 1_000)).await.unwrap();

        assert!(outcome.is_booked());
        assert_eq!(repo.appointments().await[0].purpose, "Admission Inquiry");
    }

    #[tokio::test]
    async fn booking_twice_for_same_admission_is_refused() {
        let repo = InMemoryAppointmentRepository::new();
        let handler = BookAppointmentHandler::new(Arc::new(repo.clone()));

        handler.handle(command(1, 1_000)).await.unwrap();
        let second = handler.handle(command(1, 2_000)).await.unwrap();

        assert!(matches!(second, BookingOutcome::AlreadyBooked(_)));
        assert_eq!(repo.appointments().await.len(), 1);
    }

    #[tokio::test]
    async fn taken_slot_is_reported() {
        let repo = InMemoryAppointmentRepository::new();
        let handler = BookAppointmentHandler::new(Arc::new(repo.clone()));

        handler.handle(command(1, 1_000)).await.unwrap();
        let outcome = handler.handle(command(2, 1_000)).await.unwrap();

        assert_eq!(outcome, BookingOutcome::SlotTaken);
    }
}
