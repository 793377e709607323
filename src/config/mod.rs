//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `IVY_HELP_BOT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use ivy_help_bot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod bot;
mod database;
mod error;
mod redis;
mod scheduling;
mod server;
mod whatsapp;

pub use ai::AiConfig;
pub use bot::BotConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use scheduling::SchedulingConfig;
pub use server::{Environment, ServerConfig};
pub use whatsapp::WhatsAppSettings;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Redis configuration; sessions and counters stay in memory without it
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Chat completion provider
    #[serde(default)]
    pub ai: AiConfig,

    /// WhatsApp Cloud API credentials
    pub whatsapp: WhatsAppSettings,

    /// Meeting availability
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    /// FAQ, throttling and defaults
    #[serde(default)]
    pub bot: BotConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `IVY_HELP_BOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `IVY_HELP_BOT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `IVY_HELP_BOT__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("IVY_HELP_BOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.ai.validate()?;
        self.whatsapp.validate()?;
        self.scheduling.validate()?;
        self.bot.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
