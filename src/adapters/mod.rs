//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI-compatible completions and the admission assistant
//! - `http` - WhatsApp webhook endpoints
//! - `in_memory` - Repositories for tests and local runs
//! - `postgres` - Admission, appointment, contact and message storage
//! - `rate_limiter` - Per-sender and global throttling (in-memory, Redis)
//! - `storage` - Session stores (in-memory, Redis)
//! - `whatsapp` - Cloud API client and webhook verification

pub mod ai;
pub mod http;
pub mod in_memory;
pub mod postgres;
pub mod rate_limiter;
pub mod storage;
pub mod whatsapp;
