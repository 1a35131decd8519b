//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `SLOTBOOK` prefix
//! and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use slotbook::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Booking capacity: {}", config.booking.capacity_per_slot);
//! ```

mod booking;
mod database;
mod error;

pub use booking::BookingPolicy;
pub use database::DatabaseConfig;
pub use error::ConfigError;

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Booking policy (capacity, cancellation window, retries)
    #[serde(default)]
    pub booking: BookingPolicy,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `SLOTBOOK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SLOTBOOK__DATABASE__URL=...` -> `database.url = ...`
    /// - `SLOTBOOK__BOOKING__CAPACITY_PER_SLOT=2` -> `booking.capacity_per_slot = 2`
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SLOTBOOK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.booking.validate()?;
        Ok(())
    }
}
