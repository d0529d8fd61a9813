//! Dashboard configuration.
//!
//! Values are layered: in-code defaults, then an optional TOML file, then
//! `WATCHDOG_*` environment variables. Command-line flags are applied on top
//! through [`ConfigOverrides`].

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::data::PAGE_SIZE;

/// Base URL used when nothing overrides it.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Interval between refresh ticks.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Upper bound on a single fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Raw values as they come out of the layered sources.
#[derive(Debug, Deserialize)]
struct RawConfig {
    api_url: String,
    refresh_ms: u64,
    timeout_ms: u64,
    page_size: usize,
}

/// Values given on the command line, applied over the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub refresh_interval: Option<Duration>,
    pub fetch_timeout: Option<Duration>,
    pub page_size: Option<usize>,
}

/// Resolved dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Base URL of the watchdog backend (without the endpoint path).
    pub api_url: String,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub page_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh_interval: REFRESH_INTERVAL,
            fetch_timeout: FETCH_TIMEOUT,
            page_size: PAGE_SIZE,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// Environment variables:
    /// - `WATCHDOG_API_URL`: backend base URL (default: `http://localhost:8080`)
    /// - `WATCHDOG_REFRESH_MS`: refresh interval in milliseconds (default: 10000)
    /// - `WATCHDOG_TIMEOUT_MS`: fetch timeout in milliseconds (default: 5000)
    /// - `WATCHDOG_PAGE_SIZE`: events per page (default: 10)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, Environment::with_prefix("WATCHDOG"))
    }

    fn load_from(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("refresh_ms", defaults.refresh_interval.as_millis() as u64)?
            .set_default("timeout_ms", defaults.fetch_timeout.as_millis() as u64)?
            .set_default("page_size", defaults.page_size as u64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let raw: RawConfig = builder.add_source(env.try_parsing(true)).build()?.try_deserialize()?;

        let config = Self {
            api_url: raw.api_url,
            refresh_interval: Duration::from_millis(raw.refresh_ms),
            fetch_timeout: Duration::from_millis(raw.timeout_ms),
            page_size: raw.page_size,
        };
        config.validate()
    }

    /// Apply command-line overrides and re-validate the result.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(api_url) = overrides.api_url {
            self.api_url = api_url;
        }
        if let Some(interval) = overrides.refresh_interval {
            self.refresh_interval = interval;
        }
        if let Some(timeout) = overrides.fetch_timeout {
            self.fetch_timeout = timeout;
        }
        if let Some(page_size) = overrides.page_size {
            self.page_size = page_size;
        }
        self.validate()
    }

    /// Check the settings and cap the fetch timeout at the refresh interval.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_url cannot be empty".to_string()));
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "refresh interval must be greater than 0".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "fetch timeout must be greater than 0".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be greater than 0".to_string()));
        }

        // A fetch must never hold the in-flight slot past the next tick.
        self.fetch_timeout = self.fetch_timeout.min(self.refresh_interval);
        Ok(self)
    }
}
