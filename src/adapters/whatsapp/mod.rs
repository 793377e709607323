//! WhatsApp Cloud API adapters.
//!
//! - `WhatsAppCloudClient` - outbound replies (`MessagingGateway`)
//! - `WebhookVerifier` - subscription handshake and payload signatures
//! - `WebhookPayload` - inbound notification parsing
//! - `RecordingMessenger` - in-memory gateway for tests and dry runs

mod cloud_client;
mod recording_messenger;
mod signature;
mod webhook_types;

pub use cloud_client::{WhatsAppCloudClient, WhatsAppConfig};
pub use recording_messenger::RecordingMessenger;
pub use signature::{WebhookError, WebhookVerifier};
pub use webhook_types::{CloudMessage, SendTextRequest, TextBody, WebhookPayload};
