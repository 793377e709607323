//! `AIProvider` over an OpenAI-compatible `/chat/completions` endpoint.
//!
//! Transient failures (429, 5xx, timeouts, connection errors) are retried
//! with exponential backoff up to `max_retries` times.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, TokenUsage,
};

const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    pub model: String,
    /// Up to and including the version segment, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
    endpoint: String,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("HTTP client: {}", e)))?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            config,
            client,
            endpoint,
        })
    }

    async fn attempt(&self, body: &ChatRequest<'_>) -> Result<CompletionResponse, AIError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("completion body: {}", e)))?;
        chat.into_completion()
    }

    fn transport_error(&self, e: reqwest::Error) -> AIError {
        if e.is_timeout() {
            AIError::Timeout {
                timeout_secs: self.config.timeout.as_secs() as u32,
            }
        } else {
            AIError::network(e.to_string())
        }
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let body = ChatRequest::new(&self.config.model, &request);
        let mut attempt = 0;

        loop {
            match self.attempt(&body).await {
                Ok(completion) => {
                    tracing::debug!(
                        operation = %request.metadata.operation,
                        tokens = completion.usage.total(),
                        "Completion received"
                    );
                    return Ok(completion);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    tracing::warn!(
                        operation = %request.metadata.operation,
                        request_id = %request.metadata.request_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Completion failed, retrying"
                    );
                    tokio::time::sleep(backoff(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", &self.config.model)
    }
}

/// 1s, 2s, 4s, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.min(5))
}

fn error_for_status(status: StatusCode, body: String) -> AIError {
    match status.as_u16() {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(retry_after_from(&body)),
        400 if body.contains("content_filter") => AIError::content_filtered(body),
        400..=499 => AIError::InvalidRequest(body),
        500..=599 => AIError::unavailable(format!("{}: {}", status, body)),
        _ => AIError::network(format!("unexpected status {}: {}", status, body)),
    }
}

/// Reads "try again in Ns" from an error message.
fn retry_after_from(body: &str) -> u32 {
    let Ok(ErrorEnvelope { error }) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return DEFAULT_RETRY_AFTER_SECS;
    };
    error
        .message
        .split("try again in ")
        .nth(1)
        .map(|rest| rest.chars().take_while(char::is_ascii_digit).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

// ─── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, request: &CompletionRequest) -> Self {
        let messages = request
            .system_prompt
            .iter()
            .map(|prompt| Message::new(MessageRole::System, prompt.as_str()))
            .chain(request.messages.iter().cloned())
            .collect();

        Self {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

impl ChatResponse {
    fn into_completion(self) -> Result<CompletionResponse, AIError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("completion without choices"))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: self
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
                .unwrap_or_default(),
            model: self.model,
            finish_reason,
        })
    }
}
