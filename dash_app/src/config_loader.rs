use std::path::Path;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use dash_http::CircuitBreakerConfig;
use dash_http::RemoteClientConfig;
use dash_http::RetryConfig;
use dash_http::config as defaults;
use serde::Deserialize;

/// Prefix of environment overrides, e.g. `DASH_API__RETRIES=5`
pub const ENV_PREFIX: &str = "DASH";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Backend access settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub retries: u32,
    pub retry_base_delay_ms: u64,
    pub timeout_ms: u64,
    pub failure_threshold: u32,
    pub time_window_ms: u64,
    pub cooldown_ms: u64,
    pub anti_forgery_header: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
            retries: defaults::DEFAULT_RETRIES,
            retry_base_delay_ms: defaults::DEFAULT_RETRY_BASE_DELAY_MS,
            timeout_ms: defaults::DEFAULT_TIMEOUT_MS,
            failure_threshold: defaults::DEFAULT_FAILURE_THRESHOLD,
            time_window_ms: defaults::DEFAULT_TIME_WINDOW_MS,
            cooldown_ms: defaults::DEFAULT_COOLDOWN_MS,
            anti_forgery_header: defaults::DEFAULT_ANTI_FORGERY_HEADER.to_string(),
        }
    }
}

impl ApiSection {
    /// Client settings; zero values fall back to defaults
    pub fn to_client_config(&self) -> RemoteClientConfig {
        let or = |value: u64, default: u64| if value == 0 { default } else { value };

        RemoteClientConfig {
            base_url: self.base_url.clone(),
            retry: RetryConfig {
                retries: if self.retries == 0 { defaults::DEFAULT_RETRIES } else { self.retries },
                base_delay: Duration::from_millis(or(self.retry_base_delay_ms, defaults::DEFAULT_RETRY_BASE_DELAY_MS)),
            },
            timeout: Duration::from_millis(or(self.timeout_ms, defaults::DEFAULT_TIMEOUT_MS)),
            breaker: CircuitBreakerConfig {
                failure_threshold: if self.failure_threshold == 0 { defaults::DEFAULT_FAILURE_THRESHOLD } else { self.failure_threshold },
                failure_window: Duration::from_millis(or(self.time_window_ms, defaults::DEFAULT_TIME_WINDOW_MS)),
                cooldown: Duration::from_millis(or(self.cooldown_ms, defaults::DEFAULT_COOLDOWN_MS)),
            },
            anti_forgery_header: self.anti_forgery_header.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub dir: String,
    pub level: String,
    pub stdout: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { dir: "logs".to_string(), level: "info".to_string(), stdout: true }
    }
}

/// Load a TOML file, then apply `DASH_*` environment overrides
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DashboardConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path.as_ref()))
        .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("_").separator("__").try_parsing(true))
        .build()?;

    config.try_deserialize()
}

/// Load config with fallback to default
pub fn load_config_or_default(path: &str) -> DashboardConfig {
    match load_config(path) {
        Ok(config) => {
            tracing::info!("Loaded dashboard config from {path}");
            config
        }
        Err(err) => {
            tracing::warn!("Failed to load dashboard config from {}: {}. Using defaults.", path, err);
            DashboardConfig::default()
        }
    }
}
