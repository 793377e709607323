//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port, and the admission assistant
//! built on top of it.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `OpenAIProvider` - OpenAI-compatible chat completions
//! - `LlmAdmissionAssistant` - `AdmissionAssistant` over any `AIProvider`

mod llm_assistant;
mod mock_provider;
mod openai_provider;

pub use llm_assistant::LlmAdmissionAssistant;
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
