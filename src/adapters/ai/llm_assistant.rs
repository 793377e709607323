//! Admission assistant backed by a chat completion provider.
//!
//! Each operation is one completion at temperature 0 with a plain system
//! prompt; the reply text is parsed into the domain type.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::admission::ValidationType;
use crate::domain::conversation::{
    ConversationState, FaqDocument, Intent, ValidationVerdict, YesNo,
};
use crate::ports::{
    AIError, AIProvider, AdmissionAssistant, CompletionRequest, MessageRole, RequestMetadata,
};

const LABEL_MAX_TOKENS: u32 = 16;
const VALIDATION_MAX_TOKENS: u32 = 80;
const ANSWER_MAX_TOKENS: u32 = 400;

const INTENT_PROMPT: &str = "You classify messages sent to a school's WhatsApp help line.\n\
Reply with exactly one label and nothing else:\n\
- AdmissionFlow: the sender wants to apply, register or enroll a student, or continue an application.\n\
- AskFAQ: the sender asks a question about the school.\n\
- Other: greetings and anything else.";

const YES_NO_PROMPT: &str = "Decide whether the message answers a question with yes or no.\n\
Reply with exactly one word: Yes, No, or Unclear.";

const ROLE_RESTRICTIONS: &str = "Who may be told what:\n\
- Students: class schedules, upcoming exams, school resources, extracurricular activities and school events. \
Never staff salaries, internal policies, confidential reports or other sensitive data.\n\
- Parents: admission procedures, school tour details, contact info, public events and directions. \
Never student personal data, internal policies or financial data.\n\
- Visitors: general information about the school, the admission process and contact details. \
Never any confidential information.\n\
Treat the sender as a visitor.";

/// `AdmissionAssistant` implementation over any `AIProvider`.
pub struct LlmAdmissionAssistant {
    provider: Arc<dyn AIProvider>,
}

impl LlmAdmissionAssistant {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    async fn ask(
        &self,
        operation: &str,
        system_prompt: String,
        text: &str,
        max_tokens: u32,
    ) -> Result<String, AIError> {
        let request = CompletionRequest::new(RequestMetadata::new(
            operation,
            Uuid::new_v4().to_string(),
        ))
        .with_system_prompt(system_prompt)
        .with_message(MessageRole::User, text)
        .with_max_tokens(max_tokens)
        .with_temperature(0.0);

        let response = self.provider.complete(request).await?;
        tracing::debug!(operation, reply = %response.content, "assistant reply");
        Ok(response.content.trim().to_string())
    }
}

fn validation_prompt(validation_type: ValidationType) -> String {
    let rule = match validation_type {
        ValidationType::Name => "a person's full name (letters, at least first and last name)",
        ValidationType::Email => "an email address",
        ValidationType::GradeLevel => "a school grade level such as 'Grade 3' or '7'",
        ValidationType::Semester => "a semester, which must be 1 or 2",
        ValidationType::ReferralSource => {
            "how the sender heard about the school (e.g. Twitter, Facebook, Instagram, YouTube, Friend, Other)"
        }
    };
    format!(
        "Validate whether the message is {}.\n\
         If it is acceptable, reply with exactly: valid\n\
         Otherwise reply with one short sentence explaining the problem, ending with: Please try again.",
        rule
    )
}

fn faq_prompt(document: &FaqDocument) -> String {
    format!(
        "You answer questions about the school using only the reference text below. \
         Keep answers short and friendly. If the text does not cover the question, say so \
         and suggest contacting the school office.\n\n{}\n\nReference text:\n{}",
        ROLE_RESTRICTIONS,
        document.as_str()
    )
}

#[async_trait]
impl AdmissionAssistant for LlmAdmissionAssistant {
    async fn determine_intent(
        &self,
        text: &str,
        current_state: Option<ConversationState>,
    ) -> Result<Intent, AIError> {
        let state = current_state.map(|s| s.as_str()).unwrap_or("none");
        let prompt = format!("{}\nCurrent conversation state: {}", INTENT_PROMPT, state);
        let label = self.ask("determine_intent", prompt, text, LABEL_MAX_TOKENS).await?;
        Ok(Intent::from_label(&label))
    }

    async fn validate_input(
        &self,
        validation_type: ValidationType,
        text: &str,
    ) -> Result<ValidationVerdict, AIError> {
        let reply = self
            .ask(
                "validate_input",
                validation_prompt(validation_type),
                text,
                VALIDATION_MAX_TOKENS,
            )
            .await?;
        Ok(ValidationVerdict::from_reply(&reply))
    }

    async fn interpret_yes_no(&self, text: &str) -> Result<YesNo, AIError> {
        let label = self
            .ask("interpret_yes_no", YES_NO_PROMPT.to_string(), text, LABEL_MAX_TOKENS)
            .await?;
        Ok(YesNo::from_label(&label))
    }

    async fn answer_question(
        &self,
        text: &str,
        document: &FaqDocument,
    ) -> Result<Option<String>, AIError> {
        let answer = self
            .ask("answer_question", faq_prompt(document), text, ANSWER_MAX_TOKENS)
            .await?;
        Ok(Some(answer).filter(|a| !a.is_empty()))
    }
}
