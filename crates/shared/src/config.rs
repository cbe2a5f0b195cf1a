//! Application configuration management.

use serde::Deserialize;

use crate::error::AppResult;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine presentation settings.
    pub engine: EngineConfig,
    /// Summary cache configuration.
    pub cache: CacheConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Engine presentation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Code printed for the home currency.
    #[serde(default = "default_local_currency_code")]
    pub local_currency_code: String,
    /// Decimal places used when rounding amounts for display.
    #[serde(default = "default_display_scale")]
    pub display_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            local_currency_code: default_local_currency_code(),
            display_scale: default_display_scale(),
        }
    }
}

fn default_local_currency_code() -> String {
    "UZS".to_string()
}

fn default_display_scale() -> u32 {
    2
}

/// Summary cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of memoized summaries.
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    /// Time-to-live of a memoized summary in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> u64 {
    256
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "paydesk=info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a source cannot be read or parsed.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("PAYDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
