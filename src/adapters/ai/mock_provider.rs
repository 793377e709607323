//! Scripted `AIProvider` for tests.
//!
//! Replies are queued either per assistant operation (`determine_intent`,
//! `validate_input`, `interpret_yes_no`, `answer_question`) or in one
//! shared queue. Per-operation replies win; an empty script answers
//! `"Mock response"`.
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_operation_response("determine_intent", "AdmissionFlow")
//!     .with_operation_response("validate_input", "valid");
//! let assistant = LlmAdmissionAssistant::new(Arc::new(provider));
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

const DEFAULT_CONTENT: &str = "Mock response";
const MOCK_MODEL: &str = "mock-model-1";

/// Clones share the script and the call history.
#[derive(Debug, Clone, Default)]
pub struct MockAIProvider {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

#[derive(Debug, Default)]
struct Script {
    shared: VecDeque<MockResponse>,
    by_operation: HashMap<String, VecDeque<MockResponse>>,
}

#[derive(Debug, Clone)]
pub enum MockResponse {
    Success { content: String },
    Error(MockError),
}

/// Provider failures a test can inject.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for whichever operation asks next.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.script.lock().unwrap().shared.push_back(MockResponse::Success {
            content: content.into(),
        });
        self
    }

    pub fn with_error(self, error: MockError) -> Self {
        self.script
            .lock()
            .unwrap()
            .shared
            .push_back(MockResponse::Error(error));
        self
    }

    pub fn with_operation_response(self, operation: &str, content: impl Into<String>) -> Self {
        self.push_response_for(
            operation,
            MockResponse::Success {
                content: content.into(),
            },
        );
        self
    }

    /// Queues a reply for `operation`; usable after the mock is shared.
    pub fn push_response_for(&self, operation: &str, response: MockResponse) {
        self.script
            .lock()
            .unwrap()
            .by_operation
            .entry(operation.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.metadata.operation == operation)
            .count()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self, operation: &str) -> MockResponse {
        let mut script = self.script.lock().unwrap();
        let keyed = script
            .by_operation
            .get_mut(operation)
            .and_then(VecDeque::pop_front);

        keyed
            .or_else(|| script.shared.pop_front())
            .unwrap_or_else(|| MockResponse::Success {
                content: DEFAULT_CONTENT.to_string(),
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.next_response(&request.metadata.operation);
        self.calls.lock().unwrap().push(request);

        match response {
            MockResponse::Success { content } => Ok(CompletionResponse {
                content,
                usage: TokenUsage::new(10, 5),
                model: MOCK_MODEL.to_string(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", MOCK_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MessageRole, RequestMetadata};

    fn request(operation: &str) -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(operation, "req-1"))
            .with_message(MessageRole::User, "Hello")
    }

    #[tokio::test]
    async fn shared_queue_replies_in_order_then_default() {
        let provider = MockAIProvider::new().with_response("First").with_response("Second");

        let mut replies = Vec::new();
        for _ in 0..3 {
            replies.push(provider.complete(request("any")).await.unwrap().content);
        }

        assert_eq!(replies, ["First", "Second", "Mock response"]);
    }

    #[tokio::test]
    async fn operation_queue_takes_precedence() {
        let provider = MockAIProvider::new()
            .with_response("shared")
            .with_operation_response("interpret_yes_no", "Yes");

        let yes = provider.complete(request("interpret_yes_no")).await.unwrap();
        let other = provider.complete(request("determine_intent")).await.unwrap();

        assert_eq!(yes.content, "Yes");
        assert_eq!(other.content, "shared");
        assert_eq!(provider.calls_for("interpret_yes_no"), 1);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn clones_share_the_script() {
        let provider = MockAIProvider::new();
        let handle = provider.clone();
        handle.push_response_for(
            "validate_input",
            MockResponse::Success {
                content: "valid".to_string(),
            },
        );

        let reply = provider.complete(request("validate_input")).await.unwrap();

        assert_eq!(reply.content, "valid");
        assert_eq!(handle.get_calls().len(), 1);
    }

    #[tokio::test]
    async fn injected_error_is_returned() {
        let provider =
            MockAIProvider::new().with_error(MockError::RateLimited { retry_after_secs: 30 });

        let err = provider.complete(request("answer_question")).await.unwrap_err();

        assert!(matches!(err, AIError::RateLimited { retry_after_secs: 30 }));
    }
}
