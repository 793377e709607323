//! Axum router configuration for the webhook endpoints.

use axum::{routing::get, Router};

use super::handlers::{health, receive_notification, verify_subscription, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
/// - `GET /webhooks/whatsapp` - Subscription handshake
/// - `POST /webhooks/whatsapp` - Inbound notifications (signature verified)
/// - `GET /health` - Liveness check
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new()
        .route(
            "/webhooks/whatsapp",
            get(verify_subscription).post(receive_notification),
        )
        .route("/health", get(health))
}
