//! WhatsApp Cloud API client implementing `MessagingGateway`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = WhatsAppConfig::new(access_token, phone_number_id)
//!     .with_base_url("https://graph.facebook.com/v19.0");
//! let client = WhatsAppCloudClient::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::domain::foundation::ConversationId;
use crate::ports::{MessagingError, MessagingGateway};

use super::webhook_types::SendTextRequest;

/// Cloud API configuration.
#[derive(Clone)]
pub struct WhatsAppConfig {
    access_token: SecretString,
    pub phone_number_id: String,
    /// Graph API base, including the version segment.
    pub api_base_url: String,
    pub timeout: Duration,
}

impl WhatsAppConfig {
    pub fn new(access_token: impl Into<String>, phone_number_id: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            phone_number_id: phone_number_id.into(),
            api_base_url: "https://graph.facebook.com/v19.0".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("phone_number_id", &self.phone_number_id)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Sends replies through the Cloud API messages endpoint.
pub struct WhatsAppCloudClient {
    config: WhatsAppConfig,
    client: Client,
}

impl WhatsAppCloudClient {
    pub fn new(config: WhatsAppConfig) -> Result<Self, MessagingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MessagingError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.phone_number_id
        )
    }
}

#[async_trait]
impl MessagingGateway for WhatsAppCloudClient {
    async fn send_text(&self, to: &ConversationId, body: &str) -> Result<(), MessagingError> {
        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(self.config.access_token.expose_secret())
            .json(&SendTextRequest::new(to.phone(), body))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MessagingError::Timeout
                } else {
                    MessagingError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(conversation_id = %to, "Reply sent");
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(MessagingError::AuthenticationFailed),
            code => Err(MessagingError::rejected(code, error_body)),
        }
    }
}
