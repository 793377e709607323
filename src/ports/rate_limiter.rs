//! Rate limiting port for throttling chat senders.
//!
//! Counters are fixed windows aligned to the epoch, so every instance
//! sharing a backend agrees on where a window starts.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::{ConversationId, Timestamp};

/// Port for counting inbound messages against a limit.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Counts one message against `key` and reports whether it fits.
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError>;
}

/// What a counter is kept for.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub scope: RateLimitScope,
    /// Sender phone number, or `"all"` for the global counter.
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum RateLimitScope {
    /// Every inbound message, from anyone.
    Global,
    /// Messages from one phone number.
    Sender,
}

impl RateLimitKey {
    pub fn global() -> Self {
        Self {
            scope: RateLimitScope::Global,
            identifier: "all".to_string(),
        }
    }

    /// Keyed on the phone number, so `@c.us` and bare ids share a counter.
    pub fn sender(conversation_id: &ConversationId) -> Self {
        Self {
            scope: RateLimitScope::Sender,
            identifier: conversation_id.phone().to_string(),
        }
    }

    /// Counter name for the window that `at` falls into.
    pub fn window_key(&self, at: Timestamp, window_secs: u32) -> String {
        format!(
            "ivy:ratelimit:{}:{}:{}",
            self.scope,
            self.identifier,
            window_start(at, window_secs)
        )
    }
}

/// Start of the window containing `at`, in unix seconds.
pub fn window_start(at: Timestamp, window_secs: u32) -> u64 {
    let secs = at.as_unix_secs();
    secs - secs % u64::from(window_secs.max(1))
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitScope::Global => f.write_str("global"),
            RateLimitScope::Sender => f.write_str("sender"),
        }
    }
}

/// Result of counting one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed { remaining: u32 },
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    /// Decides from the count *including* the current message.
    pub fn from_count(
        key: &RateLimitKey,
        count: u64,
        limit: u32,
        at: Timestamp,
        window_secs: u32,
    ) -> Self {
        if count > u64::from(limit) {
            let window_end = window_start(at, window_secs) + u64::from(window_secs);
            let retry_after = window_end.saturating_sub(at.as_unix_secs()).max(1);
            RateLimitResult::Denied(RateLimitDenied {
                scope: key.scope,
                limit,
                retry_after_secs: retry_after as u32,
            })
        } else {
            RateLimitResult::Allowed {
                remaining: limit - count as u32,
            }
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Why a message was throttled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDenied {
    pub scope: RateLimitScope,
    pub limit: u32,
    pub retry_after_secs: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}
