//! Rate limiter adapters.
//!
//! Implementations of the RateLimiter port for different backends.
//!
//! ## Available Adapters
//!
//! - `InMemoryRateLimiter` - In-memory for testing and single-server
//! - `RedisRateLimiter` - Redis-backed, shared across instances
//!
//! ## Usage
//!
//! ```ignore
//! use ivy_help_bot::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig};
//!
//! let limiter = InMemoryRateLimiter::new(RateLimitConfig::with_sender_limit(10));
//! ```

mod config;
mod in_memory;
mod redis;

pub use config::{RateLimitConfig, WindowLimit};
pub use in_memory::InMemoryRateLimiter;
pub use redis::RedisRateLimiter;
