//! WhatsApp Cloud API configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Credentials for sending messages and authenticating webhooks
#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppSettings {
    /// Bearer token for the Graph API
    pub access_token: String,

    /// Sending phone number id
    pub phone_number_id: String,

    /// Graph API base URL including the version segment
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Token expected in the subscription handshake
    pub verify_token: String,

    /// App secret used for `X-Hub-Signature-256`
    pub app_secret: String,

    /// Send timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl WhatsAppSettings {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate WhatsApp configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.access_token.is_empty() {
            return Err(ValidationError::MissingRequired("WHATSAPP_ACCESS_TOKEN"));
        }
        if self.phone_number_id.is_empty() {
            return Err(ValidationError::MissingRequired("WHATSAPP_PHONE_NUMBER_ID"));
        }
        if self.verify_token.is_empty() {
            return Err(ValidationError::MissingRequired("WHATSAPP_VERIFY_TOKEN"));
        }
        if self.app_secret.is_empty() {
            return Err(ValidationError::MissingRequired("WHATSAPP_APP_SECRET"));
        }
        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://") {
            return Err(ValidationError::InvalidUrl("whatsapp.api_base_url"));
        }
        Ok(())
    }
}

impl Default for WhatsAppSettings {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            api_base_url: default_api_base_url(),
            verify_token: String::new(),
            app_secret: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}

fn default_timeout() -> u64 {
    15
}
