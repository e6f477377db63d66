//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `PAYOUT_GATEWAY`
//! prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use payout_gateway::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod provider;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use provider::ProviderConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payout provider configuration (API credentials, webhook secret)
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `PAYOUT_GATEWAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAYOUT_GATEWAY__DATABASE__URL=...` -> `database.url = ...`
    /// - `PAYOUT_GATEWAY__PROVIDER__API_KEY=...` -> `provider.api_key = ...`
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYOUT_GATEWAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.provider.validate()?;
        Ok(())
    }
}
