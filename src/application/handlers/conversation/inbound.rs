//! InboundMessageHandler - entry point for every received text.
//!
//! Filters stale deliveries, then under the conversation's lock sanitizes,
//! throttles, records the message for audit and runs the engine.

use std::sync::Arc;

use crate::domain::conversation::{prompts, InboundMessage, InboundSanitizer};
use crate::domain::foundation::Timestamp;
use crate::ports::{MessageLog, MessagingGateway, RateLimitKey, RateLimitResult, RateLimiter};

use super::engine::ConversationEngine;
use super::error::ConversationError;
use super::locks::ConversationLocks;

/// What happened to an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Sent before this process started; dropped untouched.
    Stale,
    /// Throttled; the engine did not run.
    RateLimited,
    /// Ran through the engine.
    Handled,
}

/// Handler for inbound messages.
pub struct InboundMessageHandler {
    engine: Arc<ConversationEngine>,
    rate_limiter: Arc<dyn RateLimiter>,
    message_log: Arc<dyn MessageLog>,
    messenger: Arc<dyn MessagingGateway>,
    sanitizer: InboundSanitizer,
    locks: ConversationLocks,
    started_at: Timestamp,
}

impl InboundMessageHandler {
    pub fn new(
        engine: Arc<ConversationEngine>,
        rate_limiter: Arc<dyn RateLimiter>,
        message_log: Arc<dyn MessageLog>,
        messenger: Arc<dyn MessagingGateway>,
        started_at: Timestamp,
    ) -> Self {
        Self {
            engine,
            rate_limiter,
            message_log,
            messenger,
            sanitizer: InboundSanitizer::new(),
            locks: ConversationLocks::default(),
            started_at,
        }
    }

    pub async fn handle(&self, message: InboundMessage) -> Result<InboundOutcome, ConversationError> {
        if message.is_stale(self.started_at) {
            tracing::debug!(
                conversation_id = %message.conversation_id,
                message_id = %message.id,
                "Ignoring message sent before startup"
            );
            return Ok(InboundOutcome::Stale);
        }

        let id = message.conversation_id.clone();
        let _guard = self.locks.acquire(&id).await;

        let body = self.sanitizer.sanitize(&message.body);
        let message = message.with_body(body);

        if !self.within_limits(&message).await? {
            return Ok(InboundOutcome::RateLimited);
        }

        let received_at = Timestamp::now();
        if let Err(e) = self.message_log.record(&message, received_at).await {
            tracing::warn!(conversation_id = %id, error = %e, "Failed to record inbound message");
        }

        self.engine.handle(&id, &message.body, received_at).await?;

        Ok(InboundOutcome::Handled)
    }

    /// Checks the sender limit, then the global one.
    ///
    /// A throttled sender is told so; a global denial is silent. Limiter
    /// failures let the message through.
    async fn within_limits(&self, message: &InboundMessage) -> Result<bool, ConversationError> {
        let id = &message.conversation_id;

        match self.rate_limiter.check(RateLimitKey::sender(id)).await {
            Ok(RateLimitResult::Denied(denied)) => {
                tracing::info!(
                    conversation_id = %id,
                    retry_after_secs = denied.retry_after_secs,
                    "Sender rate limited"
                );
                self.messenger.send_text(id, prompts::RATE_LIMITED).await?;
                return Ok(false);
            }
            Ok(RateLimitResult::Allowed { .. }) => {}
            Err(e) => {
                tracing::warn!(conversation_id = %id, error = %e, "Rate limiter unavailable");
                return Ok(true);
            }
        }

        match self.rate_limiter.check(RateLimitKey::global()).await {
            Ok(RateLimitResult::Denied(_)) => {
                tracing::warn!(conversation_id = %id, "Global message rate exceeded, dropping message");
                Ok(false)
            }
            Ok(RateLimitResult::Allowed { .. }) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, "Rate limiter unavailable");
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{LlmAdmissionAssistant, MockAIProvider, MockResponse};
    use crate::adapters::in_memory::{
        InMemoryAdmissionRepository, InMemoryAppointmentRepository, InMemoryContactDirectory,
        InMemoryMessageLog,
    };
    use crate::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig};
    use crate::adapters::storage::InMemorySessionStore;
    use crate::adapters::whatsapp::RecordingMessenger;
    use crate::application::handlers::conversation::ConversationPorts;
    use crate::domain::conversation::ConversationState;
    use crate::domain::foundation::ConversationId;
    use crate::ports::SessionStore;

    struct Fixture {
        handler: InboundMessageHandler,
        provider: MockAIProvider,
        sessions: InMemorySessionStore,
        messenger: RecordingMessenger,
        log: InMemoryMessageLog,
        started_at: Timestamp,
    }

    fn fixture(limits: RateLimitConfig) -> Fixture {
        let provider = MockAIProvider::new();
        let sessions = InMemorySessionStore::new();
        let messenger = RecordingMessenger::new();
        let log = InMemoryMessageLog::new();
        let started_at = Timestamp::now().minus_secs(60);

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
            Arc::new(InMemoryRateLimiter::new(limits)),
            Arc::new(log.clone()),
            Arc::new(messenger.clone()),
            started_at,
        );

        Fixture {
            handler,
            provider,
            sessions,
            messenger,
            log,
            started_at,
        }
    }

    fn conversation() -> ConversationId {
        ConversationId::new("971501112222@c.us").unwrap()
    }

    #[tokio::test]
    async fn stale_message_is_dropped_without_side_effects() {
        let f = fixture(RateLimitConfig::default());
        let msg = InboundMessage::new(conversation(), "hi", f.started_at.minus_secs(1));

        let outcome = f.handler.handle(msg).await.unwrap();

        assert_eq!(outcome, InboundOutcome::Stale);
        assert!(f.messenger.sent().is_empty());
        assert!(f.log.messages().await.is_empty());
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn fresh_message_is_logged_sanitized_and_handled() {
        let f = fixture(RateLimitConfig::default());
        f.provider.push_response_for(
            "determine_intent",
            MockResponse::Success {
                content: "AdmissionFlow".to_string(),
            },
        );
        let msg = InboundMessage::new(conversation(), "  I want   to apply\u{0007} ", Timestamp::now());

        let outcome = f.handler.handle(msg).await.unwrap();

        assert_eq!(outcome, InboundOutcome::Handled);
        let logged = f.log.messages().await;
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].body, "I want to apply");

        let session = f.sessions.get(&conversation()).await.unwrap().unwrap();
        assert_eq!(session.state, ConversationState::AdmissionDisplayname);
    }

    #[tokio::test]
    async fn throttled_sender_gets_notice_and_no_state_change() {
        let f = fixture(RateLimitConfig::with_sender_limit(1));
        f.provider.push_response_for(
            "determine_intent",
            MockResponse::Success {
                content: "Other".to_string(),
            },
        );

        let first = f
            .handler
            .handle(InboundMessage::new(conversation(), "hello", Timestamp::now()))
            .await
            .unwrap();
        let second = f
            .handler
            .handle(InboundMessage::new(conversation(), "hello?", Timestamp::now()))
            .await
            .unwrap();

        assert_eq!(first, InboundOutcome::Handled);
        assert_eq!(second, InboundOutcome::RateLimited);
        assert_eq!(
            f.messenger.last_text_to(&conversation()).as_deref(),
            Some(prompts::RATE_LIMITED)
        );
        assert_eq!(f.log.messages().await.len(), 1);
        assert_eq!(f.provider.calls_for("determine_intent"), 1);
    }
}
