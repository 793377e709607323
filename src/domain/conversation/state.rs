//! Conversation state machine.
//!
//! Defines the states of an admission conversation and the transitions
//! the engine may perform between them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::admission::AdmissionField;
use crate::domain::foundation::{StateMachine, ValidationError};

/// Where a conversation currently sits.
///
/// "No session" is represented by the absence of a stored session rather
/// than by a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Waiting for the applicant's name.
    AdmissionDisplayname,
    AdmissionEmail,
    AdmissionGrade,
    AdmissionSemester,
    AdmissionReferral,
    /// All fields collected, waiting for Yes/No on the summary.
    AdmissionConfirm,
    AdmissionChooseDetailToChange,
    /// Waiting for a new value of `form.detail_to_update`.
    UpdateDetail,
    /// Admission saved; asking whether to book a meeting.
    MeetingOffer,
    /// Slot listing sent; waiting for a slot number.
    MeetingShowSlots,
    /// FAQ detour; `previous_state` holds where to return.
    AwaitingContinue,
}

impl ConversationState {
    pub const ALL: [ConversationState; 11] = [
        ConversationState::AdmissionDisplayname,
        ConversationState::AdmissionEmail,
        ConversationState::AdmissionGrade,
        ConversationState::AdmissionSemester,
        ConversationState::AdmissionReferral,
        ConversationState::AdmissionConfirm,
        ConversationState::AdmissionChooseDetailToChange,
        ConversationState::UpdateDetail,
        ConversationState::MeetingOffer,
        ConversationState::MeetingShowSlots,
        ConversationState::AwaitingContinue,
    ];

    /// Stored tag, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::AdmissionDisplayname => "admission_displayname",
            ConversationState::AdmissionEmail => "admission_email",
            ConversationState::AdmissionGrade => "admission_grade",
            ConversationState::AdmissionSemester => "admission_semester",
            ConversationState::AdmissionReferral => "admission_referral",
            ConversationState::AdmissionConfirm => "admission_confirm",
            ConversationState::AdmissionChooseDetailToChange => {
                "admission_choose_detail_to_change"
            }
            ConversationState::UpdateDetail => "update_detail",
            ConversationState::MeetingOffer => "meeting_offer",
            ConversationState::MeetingShowSlots => "meeting_show_slots",
            ConversationState::AwaitingContinue => "awaiting_continue",
        }
    }

    /// Field collected in this state, for the five collection states.
    pub fn collected_field(&self) -> Option<AdmissionField> {
        match self {
            ConversationState::AdmissionDisplayname => Some(AdmissionField::Name),
            ConversationState::AdmissionEmail => Some(AdmissionField::Email),
            ConversationState::AdmissionGrade => Some(AdmissionField::Grade),
            ConversationState::AdmissionSemester => Some(AdmissionField::Semester),
            ConversationState::AdmissionReferral => Some(AdmissionField::Referral),
            _ => None,
        }
    }

    /// Next state in the fixed collection order, ending at confirm.
    pub fn next_collection_state(&self) -> Option<ConversationState> {
        match self {
            ConversationState::AdmissionDisplayname => Some(ConversationState::AdmissionEmail),
            ConversationState::AdmissionEmail => Some(ConversationState::AdmissionGrade),
            ConversationState::AdmissionGrade => Some(ConversationState::AdmissionSemester),
            ConversationState::AdmissionSemester => Some(ConversationState::AdmissionReferral),
            ConversationState::AdmissionReferral => Some(ConversationState::AdmissionConfirm),
            _ => None,
        }
    }

    /// True for the five field collection states.
    pub fn is_collecting(&self) -> bool {
        self.collected_field().is_some()
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConversationState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("state", format!("unknown state '{}'", s)))
    }
}

impl StateMachine for ConversationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationState::*;
        // Any state can detour to the FAQ and come back to where it was.
        if *target == AwaitingContinue || *self == AwaitingContinue {
            return true;
        }
        matches!(
            (self, target),
            (AdmissionDisplayname, AdmissionEmail)
                | (AdmissionEmail, AdmissionGrade)
                | (AdmissionGrade, AdmissionSemester)
                | (AdmissionSemester, AdmissionReferral)
                | (AdmissionReferral, AdmissionConfirm)
                | (AdmissionConfirm, MeetingOffer)
                | (AdmissionConfirm, AdmissionChooseDetailToChange)
                | (AdmissionChooseDetailToChange, UpdateDetail)
                | (UpdateDetail, AdmissionConfirm)
                | (MeetingOffer, MeetingShowSlots)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        ConversationState::ALL
            .into_iter()
            .filter(|target| self.can_transition_to(target))
            .collect()
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod state_definition {
        use super::*;

        #[test]
        fn serializes_to_stored_tag() {
            let json = serde_json::to_string(&ConversationState::AdmissionChooseDetailToChange)
                .unwrap();
            assert_eq!(json, "\"admission_choose_detail_to_change\"");
        }

        #[test]
        fn serde_and_as_str_agree_for_every_state() {
            for state in ConversationState::ALL {
                let json = serde_json::to_string(&state).unwrap();
                assert_eq!(json, format!("\"{}\"", state.as_str()));
                assert_eq!(state.as_str().parse::<ConversationState>(), Ok(state));
            }
        }

        #[test]
        fn unknown_tag_fails_to_parse() {
            assert!("admission_phone".parse::<ConversationState>().is_err());
            assert!(serde_json::from_str::<ConversationState>("\"done\"").is_err());
        }
    }

    mod collection_order {
        use super::*;

        #[test]
        fn follows_name_email_grade_semester_referral_confirm() {
            let mut state = ConversationState::AdmissionDisplayname;
            let mut fields = vec![];
            while let Some(field) = state.collected_field() {
                fields.push(field);
                state = state.next_collection_state().unwrap();
            }
            assert_eq!(fields, AdmissionField::ALL.to_vec());
            assert_eq!(state, ConversationState::AdmissionConfirm);
        }

        #[test]
        fn non_collection_states_have_no_field() {
            assert!(!ConversationState::MeetingOffer.is_collecting());
            assert!(ConversationState::UpdateDetail.collected_field().is_none());
        }
    }

    mod state_machine_trait {
        use super::*;

        #[test]
        fn collection_steps_advance_one_at_a_time() {
            let state = ConversationState::AdmissionEmail;
            assert!(state.can_transition_to(&ConversationState::AdmissionGrade));
            assert!(!state.can_transition_to(&ConversationState::AdmissionConfirm));
        }

        #[test]
        fn confirm_branches_to_meeting_or_change() {
            let state = ConversationState::AdmissionConfirm;
            assert!(state.can_transition_to(&ConversationState::MeetingOffer));
            assert!(state.can_transition_to(&ConversationState::AdmissionChooseDetailToChange));
        }

        #[test]
        fn every_state_can_enter_and_leave_the_detour() {
            for state in ConversationState::ALL {
                assert!(state.can_transition_to(&ConversationState::AwaitingContinue));
                assert!(ConversationState::AwaitingContinue.can_transition_to(&state));
            }
        }

        #[test]
        fn meeting_cannot_go_back_to_collection() {
            let result = ConversationState::MeetingShowSlots
                .transition_to(ConversationState::AdmissionDisplayname);
            assert!(result.is_err());
        }

        #[test]
        fn transition_to_succeeds_for_valid_transition() {
            let result = ConversationState::UpdateDetail
                .transition_to(ConversationState::AdmissionConfirm);
            assert_eq!(result, Ok(ConversationState::AdmissionConfirm));
        }

        #[test]
        fn valid_transitions_matches_can_transition_to() {
            for state in ConversationState::ALL {
                for target in state.valid_transitions() {
                    assert!(
                        state.can_transition_to(&target),
                        "can_transition_to should return true for {:?} -> {:?}",
                        state,
                        target
                    );
                }
            }
        }

        #[test]
        fn no_state_is_terminal() {
            assert!(ConversationState::ALL.iter().all(|s| !s.is_terminal()));
        }
    }
}
