//! Per-conversation session.
//!
//! A session exists only while a flow is active; its absence from the
//! store means "no session".

use serde::{Deserialize, Serialize};

use crate::domain::admission::{AdmissionForm, AdmissionRecord};
use crate::domain::foundation::{DomainError, ErrorCode, StateMachine, Timestamp};

use super::state::ConversationState;

/// Stored state for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: ConversationState,
    #[serde(default)]
    pub form: AdmissionForm,
    /// State to return to after an FAQ detour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<ConversationState>,
    /// Set once a meeting is booked; every later message gets the
    /// completion reply.
    #[serde(default)]
    pub intent_disabled: bool,
    pub updated_at: Timestamp,
}

impl Session {
    fn at(state: ConversationState, form: AdmissionForm) -> Self {
        Self {
            state,
            form,
            previous_state: None,
            intent_disabled: false,
            updated_at: Timestamp::now(),
        }
    }

    /// Fresh admission flow, asking for the applicant's name.
    pub fn start_admission() -> Self {
        Self::at(ConversationState::AdmissionDisplayname, AdmissionForm::default())
    }

    /// Resumes a stored pending admission at the review step.
    pub fn resume(record: &AdmissionRecord) -> Self {
        Self::at(ConversationState::AdmissionConfirm, AdmissionForm::from_record(record))
    }

    /// Detour with nothing to return to.
    pub fn detour_only() -> Self {
        Self::at(ConversationState::AwaitingContinue, AdmissionForm::default())
    }

    /// Moves to `target` if the state machine allows it.
    pub fn advance(&mut self, target: ConversationState) -> Result<(), DomainError> {
        let next = self.state.transition_to(target).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("from", self.state.as_str())
                .with_detail("to", target.as_str())
        })?;
        self.state = next;
        self.touch();
        Ok(())
    }

    /// Enters the FAQ detour, remembering the current state.
    ///
    /// Re-entering from `awaiting_continue` keeps the original return point.
    pub fn enter_faq_detour(&mut self) {
        if self.state != ConversationState::AwaitingContinue {
            self.previous_state = Some(self.state);
        }
        self.state = ConversationState::AwaitingContinue;
        self.touch();
    }

    /// Leaves the detour, returning the restored state if there was one.
    pub fn restore_from_detour(&mut self) -> Option<ConversationState> {
        let previous = self.previous_state.take()?;
        self.state = previous;
        self.touch();
        Some(previous)
    }

    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
