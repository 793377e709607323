//! HTTP adapters - webhook endpoints served with axum.

pub mod whatsapp;

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use whatsapp::{webhook_routes, WebhookAppState};

/// Full application router with request tracing and a per-request timeout.
pub fn build_router(state: WebhookAppState, request_timeout: Duration) -> Router {
    webhook_routes()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
