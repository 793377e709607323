//! ConversationEngine - the per-conversation state machine.
//!
//! Every inbound text lands here after sanitizing and throttling. The
//! engine loads the session, dispatches on its state, writes the updated
//! session back (or drops it) and sends the replies.
//!
//! Without a session the text is classified: an admission request starts
//! (or resumes) the form, a question starts an FAQ detour, anything else
//! falls back to identity lookup and a greeting.

use std::sync::Arc;

use crate::application::handlers::admission::{
    CancelAdmissionCommand, CancelAdmissionHandler, SubmitAdmissionCommand, SubmitAdmissionHandler,
};
use crate::application::handlers::scheduling::{
    AvailableSlotsHandler, AvailableSlotsQuery, BookAppointmentCommand, BookAppointmentHandler,
};
use crate::domain::admission::{
    grade_number, normalize_grade, normalize_semester, AdmissionField, AdmissionForm,
};
use crate::domain::conversation::prompts;
use crate::domain::conversation::{
    ConversationState, FaqDocument, Intent, Session, ValidationVerdict, YesNo,
};
use crate::domain::foundation::{ConversationId, DomainError, Timestamp};
use crate::domain::scheduling::{format_listing, parse_slot_choice, BookingOutcome, Slot, SlotWindow};
use crate::ports::{
    AdmissionAssistant, AdmissionRepository, AppointmentRepository, ContactDirectory,
    MessagingGateway, SessionStore,
};

use super::error::ConversationError;

/// Reply at `admission_choose_detail_to_change` that withdraws the admission.
pub const CANCEL_KEYWORD: &str = "cancel";

/// Grade used for slot lookup when neither the form nor the settings have one.
const FALLBACK_GRADE: i16 = 4;

/// Ports the engine talks to.
#[derive(Clone)]
pub struct ConversationPorts {
    pub sessions: Arc<dyn SessionStore>,
    pub assistant: Arc<dyn AdmissionAssistant>,
    pub messenger: Arc<dyn MessagingGateway>,
    pub admissions: Arc<dyn AdmissionRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub contacts: Arc<dyn ContactDirectory>,
}

/// Tunables for the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub slot_window: SlotWindow,
    /// Grade assumed for slot lookup when the form has none, e.g. `"Grade 4"`.
    pub default_grade: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            slot_window: SlotWindow::default(),
            default_grade: "Grade 4".to_string(),
        }
    }
}

/// Runs one inbound text through the conversation state machine.
pub struct ConversationEngine {
    ports: ConversationPorts,
    settings: EngineSettings,
    faq: FaqDocument,
}

impl ConversationEngine {
    pub fn new(ports: ConversationPorts) -> Self {
        Self {
            ports,
            settings: EngineSettings::default(),
            faq: FaqDocument::default(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_faq(mut self, faq: FaqDocument) -> Self {
        self.faq = faq;
        self
    }

    // ─── Handlers on demand ───────────────────────────────────────────

    fn submit_handler(&self) -> SubmitAdmissionHandler {
        SubmitAdmissionHandler::new(self.ports.admissions.clone())
    }

    fn cancel_handler(&self) -> CancelAdmissionHandler {
        CancelAdmissionHandler::new(self.ports.admissions.clone())
    }

    fn slots_handler(&self) -> AvailableSlotsHandler {
        AvailableSlotsHandler::new(
            self.ports.appointments.clone(),
            self.settings.slot_window.clone(),
        )
    }

    fn booking_handler(&self) -> BookAppointmentHandler {
        BookAppointmentHandler::new(self.ports.appointments.clone())
    }

    // ─── Entry point ──────────────────────────────────────────────────

    /// Handles one sanitized text from `id`, as of `now`.
    pub async fn handle(
        &self,
        id: &ConversationId,
        text: &str,
        now: Timestamp,
    ) -> Result<(), ConversationError> {
        let Some(session) = self.ports.sessions.get(id).await? else {
            return self.route(id, text, None).await;
        };

        if session.intent_disabled {
            return self.reply(id, prompts::ADMISSION_COMPLETE).await;
        }

        tracing::debug!(conversation_id = %id, state = %session.state, "Dispatching message");

        match session.state {
            state if state.is_collecting() => self.on_collect(id, text, session).await,
            ConversationState::AdmissionConfirm => self.on_confirm(id, text, session).await,
            ConversationState::AdmissionChooseDetailToChange => {
                self.on_choose_detail(id, text, session).await
            }
            ConversationState::UpdateDetail => self.on_update_detail(id, text, session).await,
            ConversationState::MeetingOffer => self.on_meeting_offer(id, text, session, now).await,
            ConversationState::MeetingShowSlots => {
                self.on_choose_slot(id, text, session, now).await
            }
            ConversationState::AwaitingContinue => {
                self.on_awaiting_continue(id, text, session).await
            }
            _ => self.route(id, text, Some(session)).await,
        }
    }

    // ─── Default routing ──────────────────────────────────────────────

    async fn route(
        &self,
        id: &ConversationId,
        text: &str,
        session: Option<Session>,
    ) -> Result<(), ConversationError> {
        let current = session.as_ref().map(|s| s.state);
        let intent = self.ports.assistant.determine_intent(text, current).await?;
        tracing::info!(conversation_id = %id, intent = %intent, "Intent determined");

        match intent {
            Intent::AdmissionFlow => self.start_admission(id).await,
            Intent::AskFaq => {
                let session = match session {
                    Some(mut session) => {
                        session.enter_faq_detour();
                        session
                    }
                    None => Session::detour_only(),
                };
                self.answer_and_wait(id, text, session).await
            }
            Intent::Other(_) => self.identify(id).await,
        }
    }

    async fn start_admission(&self, id: &ConversationId) -> Result<(), ConversationError> {
        let session = match self.ports.admissions.find_pending_by_phone(id.phone()).await? {
            Some(record) => {
                tracing::info!(conversation_id = %id, admission_id = %record.id, "Resuming pending admission");
                Session::resume(&record)
            }
            None => Session::start_admission(),
        };

        self.ports.sessions.set(id, &session).await?;
        self.send_prompt(id, &session).await
    }

    /// Answers `text` from the FAQ and asks how else to help.
    /// `session` must already be in the detour.
    async fn answer_and_wait(
        &self,
        id: &ConversationId,
        text: &str,
        session: Session,
    ) -> Result<(), ConversationError> {
        self.ports.sessions.set(id, &session).await?;
        self.answer(id, text).await?;
        self.send_prompt(id, &session).await
    }

    async fn answer(&self, id: &ConversationId, text: &str) -> Result<(), ConversationError> {
        let answer = self.ports.assistant.answer_question(text, &self.faq).await?;
        self.reply(id, answer.as_deref().unwrap_or(prompts::REPHRASE))
            .await
    }

    async fn identify(&self, id: &ConversationId) -> Result<(), ConversationError> {
        match self.ports.contacts.lookup(id.phone()).await? {
            Some(contact) => {
                tracing::info!(conversation_id = %id, role = %contact.role, "Sender matched a known contact");
                let session = Session::detour_only();
                self.ports.sessions.set(id, &session).await?;
                self.reply(id, &contact.disclosure()).await?;
                self.send_prompt(id, &session).await
            }
            None => {
                self.ports.sessions.delete(id).await?;
                self.reply(id, prompts::GREETING).await
            }
        }
    }

    // ─── Form collection ──────────────────────────────────────────────

    async fn on_collect(
        &self,
        id: &ConversationId,
        text: &str,
        mut session: Session,
    ) -> Result<(), ConversationError> {
        let Some(field) = session.state.collected_field() else {
            return self.route(id, text, Some(session)).await;
        };

        let checked = match field {
            AdmissionField::Grade => {
                normalize_grade(text).ok_or_else(|| prompts::INVALID_GRADE.to_string())
            }
            AdmissionField::Semester => {
                normalize_semester(text).ok_or_else(|| prompts::INVALID_SEMESTER.to_string())
            }
            _ => match self
                .ports
                .assistant
                .validate_input(field.validation_type(), text)
                .await?
            {
                ValidationVerdict::Valid => Ok(text.trim().to_string()),
                ValidationVerdict::Rejected(message) => Err(message),
            },
        };

        let value = match checked {
            Ok(value) => value,
            Err(reprompt) => return self.reprompt_or_detour(id, text, session, &reprompt).await,
        };

        session.form.set(field, value);
        if let Some(next) = session.state.next_collection_state() {
            session.advance(next)?;
        }
        self.ports.sessions.set(id, &session).await?;
        self.send_prompt(id, &session).await
    }

    // ─── Review ───────────────────────────────────────────────────────

    async fn on_confirm(
        &self,
        id: &ConversationId,
        text: &str,
        mut session: Session,
    ) -> Result<(), ConversationError> {
        match self.ports.assistant.interpret_yes_no(text).await? {
            YesNo::Yes => {
                let cmd = SubmitAdmissionCommand {
                    form: session.form.clone(),
                    phone: id.phone().to_string(),
                };
                match self.submit_handler().handle(cmd).await {
                    Ok(result) => {
                        tracing::info!(
                            conversation_id = %id,
                            admission_id = %result.admission_id,
                            updated = result.updated,
                            "Admission saved"
                        );
                        session.form.admission_id = Some(result.admission_id);
                        session.advance(ConversationState::MeetingOffer)?;
                        self.ports.sessions.set(id, &session).await?;
                        self.send_prompt(id, &session).await
                    }
                    Err(e) => {
                        tracing::error!(conversation_id = %id, error = %e, "Admission submission failed");
                        self.apologize_and_drop(id).await
                    }
                }
            }
            YesNo::No => {
                session.advance(ConversationState::AdmissionChooseDetailToChange)?;
                self.ports.sessions.set(id, &session).await?;
                self.send_prompt(id, &session).await
            }
            YesNo::Unclear => {
                self.reprompt_or_detour(id, text, session, prompts::CONFIRM_UNCLEAR)
                    .await
            }
        }
    }

    async fn on_choose_detail(
        &self,
        id: &ConversationId,
        text: &str,
        mut session: Session,
    ) -> Result<(), ConversationError> {
        if text.trim().eq_ignore_ascii_case(CANCEL_KEYWORD) {
            let cmd = CancelAdmissionCommand {
                phone: id.phone().to_string(),
            };
            if let Err(e) = self.cancel_handler().handle(cmd).await {
                tracing::error!(conversation_id = %id, error = %e, "Admission cancellation failed");
                return self.apologize_and_drop(id).await;
            }
            self.ports.sessions.delete(id).await?;
            return self.reply(id, prompts::ADMISSION_CANCELLED).await;
        }

        match AdmissionField::parse_choice(text) {
            Some(field) => {
                session.form.detail_to_update = Some(field);
                session.advance(ConversationState::UpdateDetail)?;
                self.ports.sessions.set(id, &session).await?;
                self.reply(id, &prompts::new_value_prompt(field)).await
            }
            None => {
                self.reprompt_or_detour(id, text, session, prompts::CHOOSE_VALID_DETAIL)
                    .await
            }
        }
    }

    async fn on_update_detail(
        &self,
        id: &ConversationId,
        text: &str,
        mut session: Session,
    ) -> Result<(), ConversationError> {
        let Some(field) = session.form.detail_to_update else {
            tracing::warn!(conversation_id = %id, "Update requested without a chosen detail");
            self.ports.sessions.delete(id).await?;
            return self.route(id, text, None).await;
        };

        let verdict = self
            .ports
            .assistant
            .validate_input(field.validation_type(), text)
            .await?;

        let checked = match verdict {
            ValidationVerdict::Rejected(message) => Err(message),
            ValidationVerdict::Valid => match field {
                AdmissionField::Grade => {
                    normalize_grade(text).ok_or_else(|| prompts::INVALID_GRADE.to_string())
                }
                AdmissionField::Semester => {
                    normalize_semester(text).ok_or_else(|| prompts::INVALID_SEMESTER.to_string())
                }
                _ => Ok(text.trim().to_string()),
            },
        };

        let value = match checked {
            Ok(value) => value,
            Err(reprompt) => return self.reprompt_or_detour(id, text, session, &reprompt).await,
        };

        session.form.set(field, value.clone());
        session.form.detail_to_update = None;
        session.advance(ConversationState::AdmissionConfirm)?;
        self.ports.sessions.set(id, &session).await?;

        self.reply(id, &prompts::field_updated(field, &value)).await?;
        self.send_prompt(id, &session).await
    }

    // ─── Scheduling ───────────────────────────────────────────────────

    async fn on_meeting_offer(
        &self,
        id: &ConversationId,
        text: &str,
        mut session: Session,
        now: Timestamp,
    ) -> Result<(), ConversationError> {
        match self.ports.assistant.interpret_yes_no(text).await? {
            YesNo::Yes => {
                let slots = self.open_slots(&session.form, now).await?;
                if slots.is_empty() {
                    self.ports.sessions.delete(id).await?;
                    return self.reply(id, &prompts::no_slots(&self.settings.slot_window)).await;
                }

                let listing = format_listing(&slots);
                session.form.slots_list = Some(listing.clone());
                session.advance(ConversationState::MeetingShowSlots)?;
                self.ports.sessions.set(id, &session).await?;
                self.reply(id, &prompts::slot_listing(&self.settings.slot_window, &listing))
                    .await
            }
            YesNo::No => {
                self.ports.sessions.delete(id).await?;
                self.reply(id, prompts::MEETING_DECLINED).await
            }
            YesNo::Unclear => {
                self.reprompt_or_detour(id, text, session, prompts::MEETING_UNCLEAR)
                    .await
            }
        }
    }

    async fn on_choose_slot(
        &self,
        id: &ConversationId,
        text: &str,
        mut session: Session,
        now: Timestamp,
    ) -> Result<(), ConversationError> {
        // Re-fetched, so the index refers to what is open now.
        let slots = self.open_slots(&session.form, now).await?;
        let Some(index) = parse_slot_choice(text, slots.len()) else {
            return self
                .reprompt_or_detour(id, text, session, prompts::INVALID_SLOT)
                .await;
        };

        let Some(admission_id) = session.form.admission_id else {
            tracing::error!(conversation_id = %id, "Slot chosen without a saved admission");
            return self.apologize_and_drop(id).await;
        };

        let cmd = BookAppointmentCommand {
            admission_id,
            grade: self.meeting_grade(&session.form),
            slot: slots[index].timestamp(),
        };
        let outcome = match self.booking_handler().handle(cmd).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(conversation_id = %id, error = %e, "Booking failed");
                return self.apologize_and_drop(id).await;
            }
        };

        let window = &self.settings.slot_window;
        match outcome {
            BookingOutcome::Booked(appointment) => {
                session.intent_disabled = true;
                session.touch();
                self.ports.sessions.set(id, &session).await?;
                self.reply(
                    id,
                    &prompts::meeting_scheduled(&window.describe(appointment.scheduled_at)),
                )
                .await
            }
            BookingOutcome::AlreadyBooked(existing) => {
                self.ports.sessions.delete(id).await?;
                self.reply(
                    id,
                    &prompts::existing_appointment(&window.describe(existing.scheduled_at)),
                )
                .await
            }
            BookingOutcome::SlotTaken => {
                self.reply(id, prompts::SLOT_TAKEN).await?;

                let remaining = self.open_slots(&session.form, now).await?;
                if remaining.is_empty() {
                    self.ports.sessions.delete(id).await?;
                    return self.reply(id, &prompts::no_slots_remaining(window)).await;
                }

                let listing = format_listing(&remaining);
                session.form.slots_list = Some(listing.clone());
                session.touch();
                self.ports.sessions.set(id, &session).await?;
                self.reply(id, &prompts::updated_slot_listing(&listing)).await
            }
        }
    }

    async fn open_slots(&self, form: &AdmissionForm, now: Timestamp) -> Result<Vec<Slot>, DomainError> {
        let query = AvailableSlotsQuery {
            grade: self.meeting_grade(form),
            now,
        };
        self.slots_handler().handle(query).await
    }

    fn meeting_grade(&self, form: &AdmissionForm) -> i16 {
        grade_number(form.grade_or(&self.settings.default_grade))
            .or_else(|| grade_number(&self.settings.default_grade))
            .unwrap_or(FALLBACK_GRADE)
    }

    // ─── FAQ detour ───────────────────────────────────────────────────

    async fn on_awaiting_continue(
        &self,
        id: &ConversationId,
        text: &str,
        mut session: Session,
    ) -> Result<(), ConversationError> {
        let intent = self
            .ports
            .assistant
            .determine_intent(text, Some(session.state))
            .await?;
        tracing::info!(conversation_id = %id, intent = %intent, "Intent determined during detour");

        if intent == Intent::AskFaq {
            session.touch();
            self.ports.sessions.set(id, &session).await?;
            return self.answer(id, text).await;
        }

        match session.restore_from_detour() {
            Some(_) => {
                self.ports.sessions.set(id, &session).await?;
                self.send_prompt(id, &session).await
            }
            None => {
                self.ports.sessions.delete(id).await?;
                self.reply(id, prompts::CONTINUE).await
            }
        }
    }

    /// A reply that does not fit the current step: answer it if it is a
    /// question, otherwise repeat `reprompt` and stay put.
    ///
    /// The FAQ detour is open from every state, so each failed validation
    /// costs one extra `determine_intent` call before the reprompt.
    async fn reprompt_or_detour(
        &self,
        id: &ConversationId,
        text: &str,
        mut session: Session,
        reprompt: &str,
    ) -> Result<(), ConversationError> {
        let intent = self
            .ports
            .assistant
            .determine_intent(text, Some(session.state))
            .await?;

        if intent == Intent::AskFaq {
            tracing::info!(conversation_id = %id, state = %session.state, "Question mid-flow, entering FAQ detour");
            session.enter_faq_detour();
            return self.answer_and_wait(id, text, session).await;
        }

        session.touch();
        self.ports.sessions.set(id, &session).await?;
        self.reply(id, reprompt).await
    }

    // ─── Replies ──────────────────────────────────────────────────────

    async fn send_prompt(&self, id: &ConversationId, session: &Session) -> Result<(), ConversationError> {
        let prompt =
            prompts::prompt_for_state(session.state, &session.form, &self.settings.slot_window);
        self.reply(id, &prompt).await
    }

    async fn apologize_and_drop(&self, id: &ConversationId) -> Result<(), ConversationError> {
        self.ports.sessions.delete(id).await?;
        self.reply(id, prompts::SAVE_FAILED).await
    }

    async fn reply(&self, id: &ConversationId, body: &str) -> Result<(), ConversationError> {
        self.ports.messenger.send_text(id, body).await.map_err(|e| {
            tracing::warn!(conversation_id = %id, error = %e, "Failed to send reply");
            ConversationError::from(e)
        })
    }
}
