//! HTTP handlers for the WhatsApp webhook.
//!
//! Notifications are acknowledged as soon as the signature and payload
//! check out. Text messages are queued per sender in arrival order and
//! processed in the background.

use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::response::IntoResponse;
use http::{HeaderMap, StatusCode};

use crate::adapters::whatsapp::{WebhookError, WebhookPayload, WebhookVerifier};
use crate::application::handlers::conversation::InboundDispatcher;

use super::dto::{ErrorResponse, SubscriptionQuery};

const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookAppState {
    pub dispatcher: InboundDispatcher,
    pub verifier: WebhookVerifier,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /webhooks/whatsapp - Echo the challenge for a valid handshake.
pub async fn verify_subscription(
    State(state): State<WebhookAppState>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<impl IntoResponse, WebhookApiError> {
    state
        .verifier
        .verify_subscription(
            query.mode.as_deref(),
            query.verify_token.as_deref(),
            query.challenge.as_deref(),
        )
        .ok_or(WebhookApiError::SubscriptionRejected)
}

/// POST /webhooks/whatsapp - Accept a notification batch.
pub async fn receive_notification(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    state.verifier.verify_signature(&body, signature)?;

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    let messages = payload.text_messages();
    let count = messages.len();
    for message in messages {
        state.dispatcher.dispatch(message);
    }
    if count > 0 {
        tracing::debug!(
            messages = count,
            active_conversations = state.dispatcher.active_conversations(),
            "Notification queued"
        );
    }

    Ok(StatusCode::OK)
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook rejections to HTTP responses.
#[derive(Debug)]
pub enum WebhookApiError {
    SubscriptionRejected,
    Webhook(WebhookError),
}

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self::Webhook(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self {
            WebhookApiError::SubscriptionRejected => (StatusCode::FORBIDDEN, "SUBSCRIPTION_REJECTED"),
            WebhookApiError::Webhook(WebhookError::MissingSignature)
            | WebhookApiError::Webhook(WebhookError::MalformedSignature)
            | WebhookApiError::Webhook(WebhookError::InvalidSignature) => {
                (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE")
            }
            WebhookApiError::Webhook(WebhookError::InvalidPayload(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD")
            }
        };

        let message = match &self {
            WebhookApiError::SubscriptionRejected => "Verification token mismatch".to_string(),
            WebhookApiError::Webhook(err) => err.to_string(),
        };
        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}
