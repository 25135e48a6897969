//! # Counter Configuration
//!
//! Where the pharmacy server lives and how the counter behaves.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PHARMA_API_URL=http://192.168.1.20:5000                            │
//! │     PHARMA_STATS_INTERVAL_SECS=30                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/smartpharma/counter.toml (Linux)                         │
//! │     ~/Library/Application Support/com.smartpharma.counter/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://127.0.0.1:5000, 10 s timeout, 30 s stats refresh            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # counter.toml
//! [api]
//! base_url = "http://127.0.0.1:5000"
//! request_timeout_secs = 10
//!
//! [counter]
//! stats_refresh_interval_secs = 30
//! expiry_warning_days = 4
//! transaction_log_capacity = 50
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// API Settings
// =============================================================================

/// Upper bound for `transaction_log_capacity`.
pub const MAX_TRANSACTION_LOG_CAPACITY: usize = 10_000;

/// Connection settings for the pharmacy server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Server root; endpoint paths are appended (`/api/...`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// =============================================================================
// Counter Settings
// =============================================================================

/// Behavior of the sales counter itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSettings {
    /// How often sales statistics are re-fetched.
    #[serde(default = "default_stats_interval")]
    pub stats_refresh_interval_secs: u64,

    /// Warn when a selected product expires within this many days.
    #[serde(default = "default_expiry_warning_days")]
    pub expiry_warning_days: i64,

    /// Rows kept in the on-screen transaction log.
    #[serde(default = "default_log_capacity")]
    pub transaction_log_capacity: usize,
}

fn default_stats_interval() -> u64 {
    30
}

fn default_expiry_warning_days() -> i64 {
    pharma_core::DEFAULT_EXPIRY_WARNING_DAYS
}

fn default_log_capacity() -> usize {
    50
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            stats_refresh_interval_secs: default_stats_interval(),
            expiry_warning_days: default_expiry_warning_days(),
            transaction_log_capacity: default_log_capacity(),
        }
    }
}

// =============================================================================
// Counter Config
// =============================================================================

/// Complete configuration for the counter app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub counter: CounterSettings,
}

impl CounterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (counter.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading counter config from file");
                Self::from_toml(&std::fs::read_to_string(&path)?)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load counter config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a `counter.toml` document. Missing keys take defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.api.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.counter.stats_refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "stats_refresh_interval_secs must be greater than 0".into(),
            ));
        }

        if self.counter.expiry_warning_days < 0 {
            return Err(ConfigError::Invalid(
                "expiry_warning_days must not be negative".into(),
            ));
        }

        if !(1..=MAX_TRANSACTION_LOG_CAPACITY).contains(&self.counter.transaction_log_capacity) {
            return Err(ConfigError::Invalid(format!(
                "transaction_log_capacity must be between 1 and {}",
                MAX_TRANSACTION_LOG_CAPACITY
            )));
        }

        Ok(())
    }

    /// Applies `PHARMA_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are
    /// logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PHARMA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(value) = lookup("PHARMA_REQUEST_TIMEOUT_SECS") {
            match value.parse() {
                Ok(secs) => self.api.request_timeout_secs = secs,
                Err(_) => warn!(value = %value, "Ignoring invalid PHARMA_REQUEST_TIMEOUT_SECS"),
            }
        }

        if let Some(value) = lookup("PHARMA_STATS_INTERVAL_SECS") {
            match value.parse() {
                Ok(secs) => self.counter.stats_refresh_interval_secs = secs,
                Err(_) => warn!(value = %value, "Ignoring invalid PHARMA_STATS_INTERVAL_SECS"),
            }
        }

        if let Some(value) = lookup("PHARMA_EXPIRY_WARNING_DAYS") {
            match value.parse() {
                Ok(days) => self.counter.expiry_warning_days = days,
                Err(_) => warn!(value = %value, "Ignoring invalid PHARMA_EXPIRY_WARNING_DAYS"),
            }
        }

        if let Some(value) = lookup("PHARMA_LOG_CAPACITY") {
            match value.parse() {
                Ok(rows) => self.counter.transaction_log_capacity = rows,
                Err(_) => warn!(value = %value, "Ignoring invalid PHARMA_LOG_CAPACITY"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "smartpharma", "counter")
            .map(|dirs| dirs.config_dir().join("counter.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn stats_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.counter.stats_refresh_interval_secs)
    }
}
