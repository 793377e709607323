//! HTTP adapter for the WhatsApp Cloud API webhook.
//!
//! - `GET /webhooks/whatsapp` - Subscription handshake
//! - `POST /webhooks/whatsapp` - Inbound message notifications

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::WebhookAppState;
pub use routes::webhook_routes;
