//! Session Store Adapters
//!
//! Implementations of the SessionStore port.
//!
//! ## Available Adapters
//!
//! - **RedisSessionStore** - JSON sessions in Redis with an expiry
//! - **InMemorySessionStore** - Sessions in process memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemorySessionStore, RedisSessionStore};
//!
//! // Production: shared, survives restarts
//! let store = RedisSessionStore::new(conn, 3600);
//!
//! // Testing: in-memory storage
//! let store = InMemorySessionStore::new();
//! ```

mod in_memory_session_store;
mod redis_session_store;

pub use in_memory_session_store::InMemorySessionStore;
pub use redis_session_store::RedisSessionStore;
