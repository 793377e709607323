//! Integration tests for the admission conversation.
//!
//! These tests drive the engine the way the webhook does, with in-memory
//! storage, a scripted completion provider behind the real assistant and a
//! recording messenger:
//! 1. Full intake: collect, confirm, save, book a meeting
//! 2. Resuming and editing a pending admission
//! 3. FAQ detours in and out of the flow
//! 4. Scheduling edge cases

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveTime, TimeZone, Utc};
use serde_json::json;

use ivy_help_bot::adapters::ai::{LlmAdmissionAssistant, MockAIProvider, MockResponse};
use ivy_help_bot::adapters::in_memory::{
    InMemoryAdmissionRepository, InMemoryAppointmentRepository, InMemoryContactDirectory,
    InMemoryMessageLog,
};
use ivy_help_bot::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig};
use ivy_help_bot::adapters::storage::InMemorySessionStore;
use ivy_help_bot::adapters::whatsapp::RecordingMessenger;
use ivy_help_bot::application::{
    ConversationEngine, ConversationPorts, EngineSettings, InboundMessageHandler, InboundOutcome,
};
use ivy_help_bot::domain::admission::AdmissionRecord;
use ivy_help_bot::domain::conversation::{prompts, ConversationState, FaqDocument, InboundMessage};
use ivy_help_bot::domain::foundation::{AdmissionId, ConversationId, DomainError, Timestamp};
use ivy_help_bot::domain::scheduling::{Appointment, BookingOutcome, SlotWindow};
use ivy_help_bot::ports::{AppointmentRepository, SessionStore};

// =============================================================================
// Test Infrastructure
// =============================================================================

const PHONE: &str = "971500000000";

struct Bot {
    engine: ConversationEngine,
    provider: MockAIProvider,
    sessions: InMemorySessionStore,
    messenger: RecordingMessenger,
    admissions: InMemoryAdmissionRepository,
    appointments: InMemoryAppointmentRepository,
    contacts: InMemoryContactDirectory,
    id: ConversationId,
}

impl Bot {
    fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    fn with_settings(settings: EngineSettings) -> Self {
        Self::build(settings, |repo| Arc::new(repo))
    }

    /// A bot whose bookings go through `wrap` around the in-memory store.
    fn build(
        settings: EngineSettings,
        wrap: impl FnOnce(InMemoryAppointmentRepository) -> Arc<dyn AppointmentRepository>,
    ) -> Self {
        let provider = MockAIProvider::new();
        let sessions = InMemorySessionStore::new();
        let messenger = RecordingMessenger::new();
        let admissions = InMemoryAdmissionRepository::new();
        let appointments = InMemoryAppointmentRepository::new();
        let contacts = InMemoryContactDirectory::new();

        let engine = ConversationEngine::new(ConversationPorts {
            sessions: Arc::new(sessions.clone()),
            assistant: Arc::new(LlmAdmissionAssistant::new(Arc::new(provider.clone()))),
            messenger: Arc::new(messenger.clone()),
            admissions: Arc::new(admissions.clone()),
            appointments: wrap(appointments.clone()),
            contacts: Arc::new(contacts.clone()),
        })
        .with_settings(settings)
        .with_faq(FaqDocument::new("Tuition: AED 40,000 per year.\nSchool day: 7:30 AM to 2:30 PM."));

        Self {
            engine,
            provider,
            sessions,
            messenger,
            admissions,
            appointments,
            contacts,
            id: ConversationId::new(format!("{}@c.us", PHONE)).unwrap(),
        }
    }

    /// Queues the assistant's raw reply for the next call of `operation`.
    fn script(&self, operation: &str, reply: &str) -> &Self {
        self.provider.push_response_for(
            operation,
            MockResponse::Success {
                content: reply.to_string(),
            },
        );
        self
    }

    /// Sends `text` and returns every reply it produced.
    async fn say(&self, text: &str) -> Vec<String> {
        let before = self.messenger.texts_to(&self.id).len();
        self.engine.handle(&self.id, text, monday_morning()).await.unwrap();
        self.messenger.texts_to(&self.id).split_off(before)
    }

    async fn state(&self) -> Option<ConversationState> {
        self.sessions.get(&self.id).await.unwrap().map(|s| s.state)
    }
}

/// Monday 4 March 2024, 10:00 at UTC+4.
fn monday_morning() -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 4, 6, 0, 0).unwrap())
}

fn pending_record() -> AdmissionRecord {
    AdmissionRecord {
        id: AdmissionId::new(41),
        display_name: "Omar Khalid".to_string(),
        grade: 5,
        semester: 1,
        referral: Some("Friend".to_string()),
        registered_at: Timestamp::from_unix_secs(1_700_000_000),
        enrolled: false,
        email: Some("omar@example.com".to_string()),
        mobile: PHONE.to_string(),
        mobile2: None,
    }
}

// =============================================================================
// Intake Tests
// =============================================================================

#[tokio::test]
async fn full_intake_saves_admission_and_books_first_slot() {
    let bot = Bot::new();

    bot.script("determine_intent", "AdmissionFlow");
    assert_eq!(bot.say("Hi, I want to register my son").await, ["Please provide your full name."]);

    bot.script("validate_input", "valid");
    assert_eq!(bot.say("Sara Ahmed").await, ["What is your email address?"]);

    bot.script("validate_input", "valid");
    assert_eq!(
        bot.say("sara@example.com").await,
        ["For which grade are you applying? (e.g., Grade 3)"]
    );

    assert_eq!(bot.say("grade 7").await, ["Which semester are you applying for? (1 or 2)"]);

    let replies = bot.say("the 2nd one").await;
    assert!(replies[0].starts_with("How did you hear about us?"));

    bot.script("validate_input", "valid");
    let summary = bot.say("Instagram").await;
    assert_eq!(summary.len(), 1);
    assert!(summary[0].contains("- Name: Sara Ahmed"));
    assert!(summary[0].contains("- Grade: Grade 7"));
    assert!(summary[0].contains("- Semester: Semester 2"));
    assert!(summary[0].ends_with("Are all details correct now? (Yes/No)"));

    bot.script("interpret_yes_no", "Yes");
    assert_eq!(
        bot.say("yes").await,
        ["Your admission is submitted. Would you like to schedule a meeting now? (Yes/No)"]
    );

    let records = bot.admissions.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].display_name, "Sara Ahmed");
    assert_eq!(records[0].grade, 7);
    assert_eq!(records[0].semester, 2);
    assert_eq!(records[0].mobile, PHONE);

    bot.script("interpret_yes_no", "Yes");
    let listing = bot.say("sure").await;
    assert!(listing[0].starts_with("Available slots"));
    assert!(listing[0].contains("\n1. March 5, 8:00 AM\n"));
    assert!(listing[0].ends_with("Please choose a slot number:"));
    assert_eq!(bot.state().await, Some(ConversationState::MeetingShowSlots));

    assert_eq!(
        bot.say("1").await,
        ["Your meeting is scheduled for Tuesday, March 5 at 8:00 AM."]
    );

    let booked = bot.appointments.appointments().await;
    assert_eq!(booked.len(), 1);
    assert_eq!(booked[0].admission_id, records[0].id);
    assert_eq!(booked[0].grade, 7);
    assert_eq!(booked[0].purpose, "Admission Inquiry");

    // Completed conversations get a fixed reply without asking the assistant.
    let calls_before = bot.provider.call_count();
    assert_eq!(bot.say("thank you!").await, [prompts::ADMISSION_COMPLETE]);
    assert_eq!(bot.provider.call_count(), calls_before);
}

#[tokio::test]
async fn rejected_email_is_asked_again() {
    let bot = Bot::new();
    bot.script("determine_intent", "AdmissionFlow");
    bot.say("apply").await;
    bot.script("validate_input", "valid");
    bot.say("Sara Ahmed").await;

    bot.script("validate_input", "That is not a valid email address. Please try again.")
        .script("determine_intent", "Other");
    assert_eq!(
        bot.say("sara at home").await,
        ["That is not a valid email address. Please try again."]
    );
    assert_eq!(bot.state().await, Some(ConversationState::AdmissionEmail));
}

// =============================================================================
// Resume and Edit Tests
// =============================================================================

#[tokio::test]
async fn pending_admission_resumes_at_review_and_updates_in_place() {
    let bot = Bot::new();
    bot.admissions.insert_record(pending_record()).await;

    bot.script("determine_intent", "AdmissionFlow");
    let review = bot.say("I'd like to continue my application").await;
    assert!(review[0].contains("- Name: Omar Khalid"));
    assert!(review[0].contains("- Grade: Grade 5"));
    assert_eq!(bot.state().await, Some(ConversationState::AdmissionConfirm));

    bot.script("interpret_yes_no", "No");
    assert_eq!(
        bot.say("no").await,
        ["Which detail would you like to change? (Name, Email, Grade, Semester, Referral)"]
    );

    assert_eq!(bot.say("Email").await, ["Please provide your new Email."]);

    bot.script("validate_input", "valid");
    let replies = bot.say("omar.k@example.com").await;
    assert_eq!(replies[0], "Thank you! Your email has been updated to omar.k@example.com.");
    assert!(replies[1].contains("- Email: omar.k@example.com"));

    bot.script("interpret_yes_no", "Yes");
    bot.say("yes").await;

    let records = bot.admissions.records().await;
    assert_eq!(records.len(), 1, "resumed admission must not be duplicated");
    assert_eq!(records[0].id, AdmissionId::new(41));
    assert_eq!(records[0].email.as_deref(), Some("omar.k@example.com"));

    bot.script("interpret_yes_no", "No");
    assert_eq!(bot.say("not now").await, [prompts::MEETING_DECLINED]);
    assert_eq!(bot.state().await, None);
}

#[tokio::test]
async fn cancel_while_choosing_detail_removes_pending_admission() {
    let bot = Bot::new();
    bot.admissions.insert_record(pending_record()).await;

    bot.script("determine_intent", "AdmissionFlow");
    bot.say("apply").await;
    bot.script("interpret_yes_no", "No");
    bot.say("no").await;

    assert_eq!(bot.say("cancel").await, [prompts::ADMISSION_CANCELLED]);
    assert!(bot.admissions.records().await.is_empty());
    assert_eq!(bot.state().await, None);
}

#[tokio::test]
async fn resuming_from_second_number_keeps_stored_numbers() {
    let bot = Bot::new();
    bot.admissions
        .insert_record(AdmissionRecord {
            mobile: "971509999999".to_string(),
            mobile2: Some(PHONE.to_string()),
            ..pending_record()
        })
        .await;

    bot.script("determine_intent", "AdmissionFlow");
    let review = bot.say("continue my application").await;
    assert!(review[0].contains("- Name: Omar Khalid"));

    bot.script("interpret_yes_no", "Yes");
    bot.say("yes").await;

    let records = bot.admissions.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mobile, "971509999999");
    assert_eq!(records[0].mobile2.as_deref(), Some(PHONE));
}

#[tokio::test]
async fn unclear_confirmation_asks_again_without_saving() {
    let bot = Bot::new();
    bot.admissions.insert_record(pending_record()).await;
    bot.script("determine_intent", "AdmissionFlow");
    bot.say("apply").await;

    bot.script("interpret_yes_no", "Unclear")
        .script("determine_intent", "Other");
    assert_eq!(bot.say("hmm let me think").await, [prompts::CONFIRM_UNCLEAR]);
    assert_eq!(bot.state().await, Some(ConversationState::AdmissionConfirm));
    assert_eq!(bot.admissions.records().await, [pending_record()]);
}

#[tokio::test]
async fn unknown_detail_choice_reprompts() {
    let bot = Bot::new();
    bot.admissions.insert_record(pending_record()).await;
    bot.script("determine_intent", "AdmissionFlow");
    bot.say("apply").await;
    bot.script("interpret_yes_no", "No");
    bot.say("no").await;

    bot.script("determine_intent", "Other");
    assert_eq!(bot.say("phone number").await, [prompts::CHOOSE_VALID_DETAIL]);
    assert_eq!(
        bot.state().await,
        Some(ConversationState::AdmissionChooseDetailToChange)
    );
}

// =============================================================================
// FAQ Detour Tests
// =============================================================================

#[tokio::test]
async fn question_during_intake_is_answered_then_flow_resumes() {
    let bot = Bot::new();
    bot.script("determine_intent", "AdmissionFlow");
    bot.say("apply").await;
    bot.script("validate_input", "valid");
    bot.say("Sara Ahmed").await;

    bot.script("validate_input", "That is not an email address. Please try again.")
        .script("determine_intent", "AskFAQ")
        .script("answer_question", "Tuition is AED 40,000 per year.");
    assert_eq!(
        bot.say("how much are the fees?").await,
        ["Tuition is AED 40,000 per year.", "How can I assist you further?"]
    );
    assert_eq!(bot.state().await, Some(ConversationState::AwaitingContinue));

    // A follow-up question stays in the detour.
    bot.script("determine_intent", "AskFAQ")
        .script("answer_question", "The school day runs 7:30 AM to 2:30 PM.");
    assert_eq!(
        bot.say("and the timings?").await,
        ["The school day runs 7:30 AM to 2:30 PM."]
    );

    bot.script("determine_intent", "Other");
    assert_eq!(bot.say("ok thanks").await, ["What is your email address?"]);
    assert_eq!(bot.state().await, Some(ConversationState::AdmissionEmail));

    let faq_prompt = bot.provider.get_calls()
        .into_iter()
        .find(|c| c.metadata.operation == "answer_question")
        .and_then(|c| c.system_prompt)
        .unwrap();
    assert!(faq_prompt.contains("Tuition: AED 40,000 per year."));
}

#[tokio::test]
async fn standalone_question_ends_with_continue() {
    let bot = Bot::new();

    bot.script("determine_intent", "AskFAQ")
        .script("answer_question", "");
    assert_eq!(
        bot.say("do you have a swimming pool?").await,
        [prompts::REPHRASE, "How can I assist you further?"]
    );

    bot.script("determine_intent", "Other");
    assert_eq!(bot.say("never mind").await, [prompts::CONTINUE]);
    assert_eq!(bot.state().await, None);
}

#[tokio::test]
async fn known_guardian_gets_their_record() {
    let bot = Bot::new();
    bot.contacts
        .add_guardian(PHONE, json!({"displayname": "Huda Saleh", "relation": "mother"}))
        .await;

    bot.script("determine_intent", "Other");
    let replies = bot.say("hello").await;
    assert!(replies[0].starts_with("We found your info as a parent:"));
    assert!(replies[0].contains("Huda Saleh"));
    assert_eq!(replies[1], "How can I assist you further?");
    assert_eq!(bot.state().await, Some(ConversationState::AwaitingContinue));
}

#[tokio::test]
async fn stranger_gets_greeting() {
    let bot = Bot::new();
    bot.script("determine_intent", "Other");
    assert_eq!(bot.say("hello").await, [prompts::GREETING]);
    assert_eq!(bot.state().await, None);
}

// =============================================================================
// Scheduling Tests
// =============================================================================

async fn at_meeting_offer(bot: &Bot) {
    bot.admissions.insert_record(pending_record()).await;
    bot.script("determine_intent", "AdmissionFlow");
    bot.say("apply").await;
    bot.script("interpret_yes_no", "Yes");
    bot.say("yes").await;
    assert_eq!(bot.state().await, Some(ConversationState::MeetingOffer));
}

#[tokio::test]
async fn no_working_days_means_no_slots() {
    let bot = Bot::with_settings(EngineSettings {
        slot_window: SlotWindow {
            weekdays: vec![],
            ..SlotWindow::default()
        },
        ..EngineSettings::default()
    });
    at_meeting_offer(&bot).await;

    bot.script("interpret_yes_no", "Yes");
    assert_eq!(
        bot.say("yes").await,
        ["No available slots in the next three days (no days, 8:00–15:00)."]
    );
    assert_eq!(bot.state().await, None);
}

#[tokio::test]
async fn out_of_range_slot_number_reprompts() {
    let bot = Bot::new();
    at_meeting_offer(&bot).await;
    bot.script("interpret_yes_no", "Yes");
    bot.say("yes").await;

    bot.script("determine_intent", "Other");
    assert_eq!(bot.say("99").await, [prompts::INVALID_SLOT]);
    assert_eq!(bot.state().await, Some(ConversationState::MeetingShowSlots));
}

#[tokio::test]
async fn existing_appointment_is_reported_instead_of_double_booking() {
    let bot = Bot::new();
    at_meeting_offer(&bot).await;
    bot.script("interpret_yes_no", "Yes");
    bot.say("yes").await;

    let earlier = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 6, 6, 30, 0).unwrap());
    bot.appointments
        .reserve(&Appointment::admission_inquiry(AdmissionId::new(41), 5, earlier))
        .await
        .unwrap();

    assert_eq!(
        bot.say("2").await,
        ["You already have an appointment on Wednesday, March 6 at 10:30 AM."]
    );
    assert_eq!(bot.appointments.appointments().await.len(), 1);
    assert_eq!(bot.state().await, None);
}

#[tokio::test]
async fn slots_booked_by_same_grade_are_not_offered() {
    let bot = Bot::new();
    let first_slot = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 5, 4, 0, 0).unwrap());
    bot.appointments
        .reserve(&Appointment::admission_inquiry(AdmissionId::new(7), 5, first_slot))
        .await
        .unwrap();
    at_meeting_offer(&bot).await;

    bot.script("interpret_yes_no", "Yes");
    let listing = bot.say("yes").await;
    assert!(listing[0].contains("\n1. March 5, 8:30 AM\n"));
    assert!(!listing[0].contains("March 5, 8:00 AM"));
}

#[tokio::test]
async fn unclear_meeting_answer_asks_again() {
    let bot = Bot::new();
    at_meeting_offer(&bot).await;

    bot.script("interpret_yes_no", "Unclear")
        .script("determine_intent", "Other");
    assert_eq!(bot.say("what would we discuss").await, [prompts::MEETING_UNCLEAR]);
    assert_eq!(bot.state().await, Some(ConversationState::MeetingOffer));
    assert!(bot.appointments.appointments().await.is_empty());
}

/// Lets another admission take the requested slot just before the first
/// reservation, the way a concurrent booking would.
struct RivalBooking {
    inner: InMemoryAppointmentRepository,
    armed: AtomicBool,
}

impl RivalBooking {
    fn wrap(inner: InMemoryAppointmentRepository) -> Arc<dyn AppointmentRepository> {
        Arc::new(Self {
            inner,
            armed: AtomicBool::new(true),
        })
    }
}

#[async_trait]
impl AppointmentRepository for RivalBooking {
    async fn find_by_admission(&self, id: AdmissionId) -> Result<Option<Appointment>, DomainError> {
        self.inner.find_by_admission(id).await
    }

    async fn booked_between(
        &self,
        grade: i16,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Timestamp>, DomainError> {
        self.inner.booked_between(grade, from, to).await
    }

    async fn reserve(&self, appointment: &Appointment) -> Result<BookingOutcome, DomainError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            let rival = Appointment::admission_inquiry(
                AdmissionId::new(99),
                appointment.grade,
                appointment.scheduled_at,
            );
            self.inner.reserve(&rival).await?;
        }
        self.inner.reserve(appointment).await
    }
}

#[tokio::test]
async fn lost_slot_race_relists_remaining_slots() {
    let bot = Bot::build(EngineSettings::default(), RivalBooking::wrap);
    at_meeting_offer(&bot).await;
    bot.script("interpret_yes_no", "Yes");
    let listing = bot.say("yes").await;
    assert!(listing[0].contains("\n1. March 5, 8:00 AM\n"));

    let replies = bot.say("1").await;
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], prompts::SLOT_TAKEN);
    assert!(replies[1].starts_with("Here are the updated available slots:\n1. March 5, 8:30 AM\n"));
    assert!(!replies[1].contains("March 5, 8:00 AM"));
    assert_eq!(bot.state().await, Some(ConversationState::MeetingShowSlots));

    assert_eq!(
        bot.say("1").await,
        ["Your meeting is scheduled for Tuesday, March 5 at 8:30 AM."]
    );
    let booked = bot.appointments.appointments().await;
    assert_eq!(booked.len(), 2);
    assert!(booked.iter().any(|a| a.admission_id == AdmissionId::new(41)));
}

#[tokio::test]
async fn lost_race_for_last_slot_ends_conversation() {
    let single_slot = SlotWindow {
        lookahead_days: 1,
        day_end: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        ..SlotWindow::default()
    };
    let bot = Bot::build(
        EngineSettings {
            slot_window: single_slot,
            ..EngineSettings::default()
        },
        RivalBooking::wrap,
    );
    at_meeting_offer(&bot).await;
    bot.script("interpret_yes_no", "Yes");
    let listing = bot.say("yes").await;
    assert!(listing[0].starts_with("Available slots (Tomorrow, 8:00 AM–8:30 AM, every 30 min, Sun–Thu):"));

    assert_eq!(
        bot.say("1").await,
        [prompts::SLOT_TAKEN, "No available slots remaining in the next day."]
    );
    assert_eq!(bot.state().await, None);
    assert_eq!(bot.appointments.appointments().await.len(), 1);
}

// =============================================================================
// Inbound Pipeline Tests
// =============================================================================

#[tokio::test]
async fn pipeline_logs_and_processes_fresh_messages_only() {
    let provider = MockAIProvider::new().with_operation_response("determine_intent", "AdmissionFlow");
    let sessions = InMemorySessionStore::new();
    let messenger = RecordingMessenger::new();
    let log = InMemoryMessageLog::new();
    let started_at = Timestamp::now();

    let engine = ConversationEngine::new(ConversationPorts {
        sessions: Arc::new(sessions.clone()),
        assistant: Arc::new(LlmAdmissionAssistant::new(Arc::new(provider.clone()))),
        messenger: Arc::new(messenger.clone()),
        admissions: Arc::new(InMemoryAdmissionRepository::new()),
        appointments: Arc::new(InMemoryAppointmentRepository::new()),
        contacts: Arc::new(InMemoryContactDirectory::new()),
    });
    let handler = InboundMessageHandler::new(
        Arc::new(engine),
        Arc::new(InMemoryRateLimiter::new(RateLimitConfig::default())),
        Arc::new(log.clone()),
        Arc::new(messenger.clone()),
        started_at,
    );
    let id = ConversationId::new(PHONE).unwrap();

    let old = InboundMessage::new(id.clone(), "apply", started_at.minus_secs(30));
    assert_eq!(handler.handle(old).await.unwrap(), InboundOutcome::Stale);

    let fresh = InboundMessage::new(id.clone(), "apply <|im_start|>", started_at.plus_secs(1));
    assert_eq!(handler.handle(fresh).await.unwrap(), InboundOutcome::Handled);

    let logged = log.messages().await;
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].body, "apply");
    assert_eq!(messenger.texts_to(&id), ["Please provide your full name."]);
    assert_eq!(
        sessions.get(&id).await.unwrap().map(|s| s.state),
        Some(ConversationState::AdmissionDisplayname)
    );
}
