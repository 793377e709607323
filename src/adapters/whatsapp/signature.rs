//! Webhook authentication for the WhatsApp Cloud API.
//!
//! Two checks:
//! - the subscription handshake (`hub.mode`, `hub.verify_token`, `hub.challenge`)
//! - `X-Hub-Signature-256: sha256=<hex>`, an HMAC-SHA256 of the raw body keyed
//!   with the app secret, compared in constant time

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Webhook request rejections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    #[error("missing X-Hub-Signature-256 header")]
    MissingSignature,

    #[error("malformed signature header")]
    MalformedSignature,

    #[error("signature does not match payload")]
    InvalidSignature,

    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Verifies webhook handshakes and payload signatures.
#[derive(Clone)]
pub struct WebhookVerifier {
    verify_token: SecretString,
    app_secret: SecretString,
}

impl WebhookVerifier {
    pub fn new(verify_token: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            verify_token: SecretString::new(verify_token.into()),
            app_secret: SecretString::new(app_secret.into()),
        }
    }

    /// Returns the challenge to echo when the handshake is valid.
    pub fn verify_subscription(
        &self,
        mode: Option<&str>,
        token: Option<&str>,
        challenge: Option<&str>,
    ) -> Option<String> {
        let token_matches = token
            .map(|t| {
                t.as_bytes()
                    .ct_eq(self.verify_token.expose_secret().as_bytes())
                    .into()
            })
            .unwrap_or(false);

        if mode == Some("subscribe") && token_matches {
            challenge.map(str::to_string)
        } else {
            None
        }
    }

    /// Checks the `X-Hub-Signature-256` header against the raw body.
    pub fn verify_signature(&self, body: &[u8], header: Option<&str>) -> Result<(), WebhookError> {
        let header = header.ok_or(WebhookError::MissingSignature)?;
        let provided = header
            .trim()
            .strip_prefix(SIGNATURE_PREFIX)
            .and_then(|h| hex::decode(h).ok())
            .ok_or(WebhookError::MalformedSignature)?;

        let expected = self.sign(body)?;

        if expected.as_slice().ct_eq(provided.as_slice()).unwrap_u8() != 1 {
            tracing::warn!("Invalid webhook signature");
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    fn sign(&self, body: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(self.app_secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(body);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Header value a correctly signed request would carry.
    pub fn signature_header(&self, body: &[u8]) -> Result<String, WebhookError> {
        Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(self.sign(body)?)))
    }
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new("verify-me", "app-secret")
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Subscription Handshake Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn handshake_echoes_challenge() {
        let challenge =
            verifier().verify_subscription(Some("subscribe"), Some("verify-me"), Some("12345"));
        assert_eq!(challenge.as_deref(), Some("12345"));
    }

    #[test]
    fn handshake_rejects_wrong_token_or_mode() {
        let v = verifier();
        assert!(v
            .verify_subscription(Some("subscribe"), Some("nope"), Some("1"))
            .is_none());
        assert!(v
            .verify_subscription(Some("unsubscribe"), Some("verify-me"), Some("1"))
            .is_none());
        assert!(v.verify_subscription(None, None, Some("1")).is_none());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn valid_signature_is_accepted() {
        let v = verifier();
        let body = br#"{"object":"whatsapp_business_account"}"#;
        let header = v.signature_header(body).unwrap();
        assert!(v.verify_signature(body, Some(&header)).is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let v = verifier();
        let header = v.signature_header(br#"{"a":1}"#).unwrap();
        assert_eq!(
            v.verify_signature(br#"{"a":2}"#, Some(&header)),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn signature_from_other_secret_is_rejected() {
        let body = b"payload";
        let header = WebhookVerifier::new("verify-me", "other")
            .signature_header(body)
            .unwrap();
        assert_eq!(
            verifier().verify_signature(body, Some(&header)),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn missing_or_malformed_header_is_rejected() {
        let v = verifier();
        assert_eq!(v.verify_signature(b"x", None), Err(WebhookError::MissingSignature));
        assert_eq!(
            v.verify_signature(b"x", Some("sha1=abcd")),
            Err(WebhookError::MalformedSignature)
        );
        assert_eq!(
            v.verify_signature(b"x", Some("sha256=not-hex")),
            Err(WebhookError::MalformedSignature)
        );
    }
}
