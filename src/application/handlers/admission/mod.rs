//! Admission command handlers.

mod cancel_admission;
mod submit_admission;

pub use cancel_admission::{CancelAdmissionCommand, CancelAdmissionHandler};
pub use submit_admission::{SubmitAdmissionCommand, SubmitAdmissionHandler, SubmitAdmissionResult};
