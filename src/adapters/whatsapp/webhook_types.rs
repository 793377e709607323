//! WhatsApp Cloud API webhook payloads.
//!
//! Only the parts needed to receive text messages are modelled; unknown
//! fields are ignored and non-text messages are skipped.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::InboundMessage;
use crate::domain::foundation::{ConversationId, Timestamp};

/// Top-level webhook notification.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<CloudMessage>,
}

/// One message as delivered by the Cloud API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CloudMessage {
    pub from: String,
    #[serde(default)]
    pub id: String,
    /// Unix seconds, sent as a string.
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextBody>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextBody {
    pub body: String,
}

impl WebhookPayload {
    /// Text messages in the payload, in delivery order.
    ///
    /// Messages with an unparseable sender or timestamp are skipped with a warning.
    pub fn text_messages(&self) -> Vec<InboundMessage> {
        self.entry
            .iter()
            .flat_map(|entry| &entry.changes)
            .filter(|change| change.field == "messages")
            .flat_map(|change| &change.value.messages)
            .filter_map(CloudMessage::to_inbound)
            .collect()
    }
}

impl CloudMessage {
    fn to_inbound(&self) -> Option<InboundMessage> {
        if self.kind != "text" {
            tracing::debug!(kind = %self.kind, "Skipping non-text message");
            return None;
        }
        let body = self.text.as_ref()?.body.clone();

        let sent_at = match self.timestamp.parse::<u64>() {
            Ok(secs) => Timestamp::from_unix_secs(secs),
            Err(_) => {
                tracing::warn!(message_id = %self.id, timestamp = %self.timestamp, "Unparseable message timestamp");
                return None;
            }
        };

        match ConversationId::new(&self.from) {
            Ok(conversation_id) => Some(InboundMessage::new(conversation_id, body, sent_at)),
            Err(e) => {
                tracing::warn!(message_id = %self.id, error = %e, "Message without sender");
                None
            }
        }
    }
}

/// Outbound text message body for `POST /{phone_number_id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct SendTextRequest<'a> {
    pub messaging_product: &'static str,
    pub to: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: SendTextBody<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendTextBody<'a> {
    pub body: &'a str,
}

impl<'a> SendTextRequest<'a> {
    pub fn new(to: &'a str, body: &'a str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: SendTextBody { body },
        }
    }
}
