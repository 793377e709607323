//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid listen address")]
    InvalidListenAddress,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Invalid meeting hours: {0}")]
    InvalidMeetingHours(String),

    #[error("Unknown weekday: {0}")]
    InvalidWeekday(String),

    #[error("Invalid UTC offset")]
    InvalidUtcOffset,

    #[error("Message rate limit must be greater than zero")]
    InvalidRateLimit,

    #[error("Invalid default grade: {0}")]
    InvalidDefaultGrade(String),
}
