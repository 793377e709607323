//! Booked admission meetings.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AdmissionId, Timestamp};

/// Purpose recorded for meetings booked through the chat flow.
pub const ADMISSION_INQUIRY: &str = "Admission Inquiry";

/// A stored appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub admission_id: AdmissionId,
    pub grade: i16,
    pub scheduled_at: Timestamp,
    pub purpose: String,
}

impl Appointment {
    /// An admission inquiry meeting for `admission_id` at `scheduled_at`.
    pub fn admission_inquiry(admission_id: AdmissionId, grade: i16, scheduled_at: Timestamp) -> Self {
        Self {
            admission_id,
            grade,
            scheduled_at,
            purpose: ADMISSION_INQUIRY.to_string(),
        }
    }
}

/// Result of a conditional booking write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(Appointment),
    /// Another admission of the same grade holds the slot.
    SlotTaken,
    /// This admission already has an appointment.
    AlreadyBooked(Appointment),
}

impl BookingOutcome {
    pub fn is_booked(&self) -> bool {
        matches!(self, BookingOutcome::Booked(_))
    }
}
