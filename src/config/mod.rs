//! Application configuration module
//!
//! Configuration is read from environment variables with the `TRIP_TRACKER`
//! prefix; nested values use a double underscore as separator.
//!
//! # Example
//!
//! ```no_run
//! use trip_tracker::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod redis;
mod server;
mod tracking;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use tracking::TrackingConfig;

use serde::Deserialize;

const ENV_PREFIX: &str = "TRIP_TRACKER";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub redis: RedisConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,
}

impl AppConfig {
    /// Load configuration from the environment (and `.env` when present).
    ///
    /// - `TRIP_TRACKER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TRIP_TRACKER__DATABASE__URL=...` -> `database.url = ...`
    /// - `TRIP_TRACKER__TRACKING__PONG_WAIT_SECS=30` -> `tracking.pong_wait_secs = 30`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic checks that deserialization cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.tracking.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
