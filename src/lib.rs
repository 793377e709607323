//! IVY Help Bot - WhatsApp admissions assistant for a school.
//!
//! Parents message the school's WhatsApp number; the bot collects an
//! admission form, saves it, offers a meeting slot and answers FAQ
//! questions along the way.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
