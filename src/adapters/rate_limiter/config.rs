//! Message limits per scope.

use crate::ports::RateLimitScope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// All inbound messages together.
    pub global: WindowLimit,
    /// Messages from one sender.
    pub per_sender: WindowLimit,
}

/// At most `requests` per `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimit {
    pub requests: u32,
    pub window_secs: u32,
}

impl WindowLimit {
    pub fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            window_secs: 60,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global: WindowLimit::per_minute(1_000),
            per_sender: WindowLimit::per_minute(10),
        }
    }
}

impl RateLimitConfig {
    /// Default global limit with `messages_per_minute` per sender.
    pub fn with_sender_limit(messages_per_minute: u32) -> Self {
        Self {
            per_sender: WindowLimit::per_minute(messages_per_minute),
            ..Self::default()
        }
    }

    pub fn limit_for(&self, scope: RateLimitScope) -> WindowLimit {
        match scope {
            RateLimitScope::Global => self.global,
            RateLimitScope::Sender => self.per_sender,
        }
    }
}
