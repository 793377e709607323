//! Scheduling domain module.
//!
//! Meeting availability and booked appointments.

mod appointment;
mod slot;

pub use appointment::{Appointment, BookingOutcome, ADMISSION_INQUIRY};
pub use slot::{format_listing, parse_slot_choice, Slot, SlotWindow};
