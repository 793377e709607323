//! Redis-backed rate limiter, shared by every bot instance.
//!
//! Each window gets its own counter key; INCR and EXPIRE run in one
//! MULTI block so a counter never outlives its window.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::domain::foundation::Timestamp;
use crate::ports::{RateLimitError, RateLimitKey, RateLimitResult, RateLimiter};

use super::config::RateLimitConfig;

#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: MultiplexedConnection,
    config: RateLimitConfig,
}

impl RedisRateLimiter {
    pub fn new(conn: MultiplexedConnection, config: RateLimitConfig) -> Self {
        Self { conn, config }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let now = Timestamp::now();
        let limit = self.config.limit_for(key.scope);
        let counter = key.window_key(now, limit.window_secs);

        let mut conn = self.conn.clone();
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(&counter, 1_u64)
            .expire(&counter, i64::from(limit.window_secs))
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Unavailable(e.to_string()))?;

        Ok(RateLimitResult::from_count(
            &key,
            count,
            limit.requests,
            now,
            limit.window_secs,
        ))
    }
}

impl std::fmt::Debug for RedisRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
