//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine trait)
//! - `admission` - Applicant form, admission records, grade/semester normalization
//! - `conversation` - Session state machine, prompts, inbound sanitizing
//! - `scheduling` - Meeting slot window and appointments

pub mod admission;
pub mod conversation;
pub mod foundation;
pub mod scheduling;
