//! Admission domain module.
//!
//! The applicant form collected over chat, the records it turns into, and
//! the normalization rules for grade and semester replies.

mod field;
mod form;
mod normalize;
mod record;

pub use field::{AdmissionField, ValidationType};
pub use form::AdmissionForm;
pub use normalize::{grade_number, normalize_grade, normalize_semester, semester_number};
pub use record::{AdmissionRecord, ContactRole, KnownContact, NewAdmission};
