//! Fixed reply texts and the per-state prompts.

use crate::domain::admission::{AdmissionField, AdmissionForm};
use crate::domain::scheduling::SlotWindow;

use super::state::ConversationState;

pub const ADMISSION_COMPLETE: &str =
    "Your admission process is complete. Let us know if you need anything else.";
pub const INVALID_GRADE: &str = "Invalid grade. Please try again.";
pub const INVALID_SEMESTER: &str = "Invalid semester. Please try again.";
pub const SAVE_FAILED: &str = "There was a problem saving your data. Please try again later.";
pub const CONFIRM_UNCLEAR: &str = "I did not understand. Are all details correct? (Yes/No)";
pub const CHOOSE_VALID_DETAIL: &str =
    "Please choose a valid detail: Name, Email, Grade, Semester, or Referral.";
pub const ADMISSION_CANCELLED: &str = "Your admission process has been cancelled.";
pub const MEETING_DECLINED: &str = "No worries! Let us know if you need anything else.";
pub const MEETING_UNCLEAR: &str =
    "I did not understand. Would you like to schedule a meeting? (Yes/No)";
pub const INVALID_SLOT: &str = "Invalid slot number. Please choose one of the listed options.";
pub const SLOT_TAKEN: &str = "Sorry, that slot just got booked. Please choose another slot number.";
pub const REPHRASE: &str = "Could you please rephrase your question?";
pub const CONTINUE: &str = "Let’s continue. How can I assist you?";
pub const GREETING: &str =
    "Hello! You can ask about admissions or any general question about the school.";
pub const RATE_LIMITED: &str = "You are sending messages too quickly.";

const UPDATED_SLOTS_HEADER: &str = "Here are the updated available slots:";
const CHOOSE_SLOT: &str = "Please choose a slot number:";

/// Prompt sent on entering `state`.
pub fn prompt_for_state(
    state: ConversationState,
    form: &AdmissionForm,
    window: &SlotWindow,
) -> String {
    match state {
        ConversationState::AdmissionDisplayname => "Please provide your full name.".to_string(),
        ConversationState::AdmissionEmail => "What is your email address?".to_string(),
        ConversationState::AdmissionGrade => {
            "For which grade are you applying? (e.g., Grade 3)".to_string()
        }
        ConversationState::AdmissionSemester => {
            "Which semester are you applying for? (1 or 2)".to_string()
        }
        ConversationState::AdmissionReferral => {
            "How did you hear about us? (Twitter, Facebook, Instagram, YouTube, Friend, Other)"
                .to_string()
        }
        ConversationState::AdmissionConfirm => format!(
            "Please review your details:\n\
             - Name: {}\n\
             - Email: {}\n\
             - Grade: {}\n\
             - Semester: {}\n\
             - Referral: {}\n\
             \n\
             Are all details correct now? (Yes/No)",
            form.display(AdmissionField::Name),
            form.display(AdmissionField::Email),
            form.display(AdmissionField::Grade),
            form.display(AdmissionField::Semester),
            form.display(AdmissionField::Referral),
        ),
        ConversationState::AdmissionChooseDetailToChange => {
            "Which detail would you like to change? (Name, Email, Grade, Semester, Referral)"
                .to_string()
        }
        ConversationState::UpdateDetail => match form.detail_to_update {
            Some(field) => new_value_prompt(field),
            None => "Please provide the new value.".to_string(),
        },
        ConversationState::MeetingOffer => {
            "Your admission is submitted. Would you like to schedule a meeting now? (Yes/No)"
                .to_string()
        }
        ConversationState::MeetingShowSlots => {
            slot_listing(window, form.slots_list.as_deref().unwrap_or_default())
        }
        ConversationState::AwaitingContinue => "How can I assist you further?".to_string(),
    }
}

/// `Please provide your new <Label>.`
pub fn new_value_prompt(field: AdmissionField) -> String {
    format!("Please provide your new {}.", field.label())
}

/// `Thank you! Your <field> has been updated to <value>.`
pub fn field_updated(field: AdmissionField, value: &str) -> String {
    format!("Thank you! Your {} has been updated to {}.", field.keyword(), value)
}

/// First slot listing after the user accepts a meeting.
pub fn slot_listing(window: &SlotWindow, listing: &str) -> String {
    let header = format!(
        "Available slots ({}, {}, every {} min, {}):",
        window.offered_days_label(),
        window.hours_label_12h(),
        window.slot_minutes,
        window.days_label()
    );
    format!("{}\n{}\n{}", header, listing, CHOOSE_SLOT)
}

/// Listing re-sent after losing a slot race.
pub fn updated_slot_listing(listing: &str) -> String {
    format!("{}\n{}\n{}", UPDATED_SLOTS_HEADER, listing, CHOOSE_SLOT)
}

/// Nothing open in the window when the user accepts a meeting.
pub fn no_slots(window: &SlotWindow) -> String {
    format!(
        "No available slots in the {} ({}, {}).",
        window.lookahead_label(),
        window.days_label(),
        window.hours_label()
    )
}

/// Nothing left after losing a slot race.
pub fn no_slots_remaining(window: &SlotWindow) -> String {
    format!("No available slots remaining in the {}.", window.lookahead_label())
}

pub fn meeting_scheduled(when: &str) -> String {
    format!("Your meeting is scheduled for {}.", when)
}

pub fn existing_appointment(when: &str) -> String {
    format!("You already have an appointment on {}.", when)
}
