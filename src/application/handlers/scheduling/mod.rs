//! Meeting scheduling handlers.

mod available_slots;
mod book_appointment;

pub use available_slots::{AvailableSlotsHandler, AvailableSlotsQuery};
pub use book_appointment::{BookAppointmentCommand, BookAppointmentHandler};
