//! In-memory rate limiter.
//!
//! Counters live in this process only; use `RedisRateLimiter` when more
//! than one instance serves the webhook.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::foundation::Timestamp;
use crate::ports::{window_start, RateLimitError, RateLimitKey, RateLimitResult, RateLimiter};

use super::config::RateLimitConfig;

#[derive(Debug)]
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    /// Window start and count per key. Entries whose window has ended are
    /// dropped on the next check.
    counters: Mutex<HashMap<RateLimitKey, (u64, u64)>>,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Counts a message as of `at`.
    pub async fn check_at(&self, key: RateLimitKey, at: Timestamp) -> RateLimitResult {
        let limit = self.config.limit_for(key.scope);
        let window = window_start(at, limit.window_secs);

        let now = at.as_unix_secs();
        let mut counters = self.counters.lock().await;
        counters.retain(|k, (start, _)| {
            *start + u64::from(self.config.limit_for(k.scope).window_secs.max(1)) > now
        });
        let entry = counters.entry(key.clone()).or_insert((window, 0));
        if entry.0 != window {
            *entry = (window, 0);
        }
        entry.1 += 1;

        RateLimitResult::from_count(&key, entry.1, limit.requests, at, limit.window_secs)
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, Timestamp::now()).await)
    }
}
