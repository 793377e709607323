//! AvailableSlotsHandler - Query handler for open meeting slots.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::scheduling::{Slot, SlotWindow};
use crate::ports::AppointmentRepository;

/// Query for open slots for one grade.
#[derive(Debug, Clone, Copy)]
pub struct AvailableSlotsQuery {
    pub grade: i16,
    pub now: Timestamp,
}

/// Handler for listing open slots: the window's candidates minus the
/// grade's bookings.
pub struct AvailableSlotsHandler {
    appointments: Arc<dyn AppointmentRepository>,
    window: SlotWindow,
}

impl AvailableSlotsHandler {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, window: SlotWindow) -> Self {
        Self {
            appointments,
            window,
        }
    }

    pub async fn handle(&self, query: AvailableSlotsQuery) -> Result<Vec<Slot>, DomainError> {
        let (from, to) = self.window.bounds(query.now);
        let booked = self
            .appointments
            .booked_between(query.grade, from, to)
            .await?;

        let slots = self.window.available_slots(query.now, &booked);
        tracing::debug!(
            grade = query.grade,
            booked = booked.len(),
            available = slots.len(),
            "Computed available slots"
        );
        Ok(slots)
    }
}
