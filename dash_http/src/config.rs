use std::time::Duration;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::retry::RetryConfig;

/// Backend root used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Total attempts per call
pub const DEFAULT_RETRIES: u32 = 3;

/// Base of the exponential backoff in milliseconds
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 300;

/// Per-attempt timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Failures within the window that open the circuit
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Failure window in milliseconds
pub const DEFAULT_TIME_WINDOW_MS: u64 = 10_000;

/// Circuit cooldown in milliseconds
pub const DEFAULT_COOLDOWN_MS: u64 = 15_000;

/// Header carrying the anti-forgery token
pub const DEFAULT_ANTI_FORGERY_HEADER: &str = "X-XSRF-TOKEN";

/// Environment variable names
pub mod env {
    pub const BASE_URL: &str = "DASH_API_BASE_URL";
    pub const RETRIES: &str = "DASH_API_RETRIES";
    pub const RETRY_BASE_DELAY_MS: &str = "DASH_API_RETRY_BASE_DELAY_MS";
    pub const TIMEOUT_MS: &str = "DASH_API_TIMEOUT_MS";
    pub const FAILURE_THRESHOLD: &str = "DASH_CB_FAILURE_THRESHOLD";
    pub const TIME_WINDOW_MS: &str = "DASH_CB_TIME_WINDOW_MS";
    pub const COOLDOWN_MS: &str = "DASH_CB_COOLDOWN_MS";
    pub const ANTI_FORGERY_HEADER: &str = "DASH_API_ANTI_FORGERY_HEADER";
}

/// Settings read once when a [`crate::RemoteClient`] is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteClientConfig {
    pub base_url: String,
    pub retry: RetryConfig,
    pub timeout: Duration,
    pub breaker: CircuitBreakerConfig,
    pub anti_forgery_header: String,
}

impl Default for RemoteClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryConfig { retries: DEFAULT_RETRIES, base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS) },
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            breaker: CircuitBreakerConfig {
                failure_threshold: DEFAULT_FAILURE_THRESHOLD,
                failure_window: Duration::from_millis(DEFAULT_TIME_WINDOW_MS),
                cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            },
            anti_forgery_header: DEFAULT_ANTI_FORGERY_HEADER.to_string(),
        }
    }
}

impl RemoteClientConfig {
    /// Read settings from the process environment (can be overridden per variable)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; missing, unparsable or non-positive values use defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let positive = |key: &str, default: u64| -> u64 {
            lookup(key).and_then(|s| s.trim().parse::<u64>().ok()).filter(|v| *v > 0).unwrap_or(default)
        };
        let non_empty = |key: &str, default: &str| -> String {
            lookup(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).unwrap_or_else(|| default.to_string())
        };

        Self {
            base_url: non_empty(env::BASE_URL, DEFAULT_BASE_URL),
            retry: RetryConfig {
                retries: positive(env::RETRIES, DEFAULT_RETRIES as u64).min(u32::MAX as u64) as u32,
                base_delay: Duration::from_millis(positive(env::RETRY_BASE_DELAY_MS, DEFAULT_RETRY_BASE_DELAY_MS)),
            },
            timeout: Duration::from_millis(positive(env::TIMEOUT_MS, DEFAULT_TIMEOUT_MS)),
            breaker: CircuitBreakerConfig {
                failure_threshold: positive(env::FAILURE_THRESHOLD, DEFAULT_FAILURE_THRESHOLD as u64).min(u32::MAX as u64) as u32,
                failure_window: Duration::from_millis(positive(env::TIME_WINDOW_MS, DEFAULT_TIME_WINDOW_MS)),
                cooldown: Duration::from_millis(positive(env::COOLDOWN_MS, DEFAULT_COOLDOWN_MS)),
            },
            anti_forgery_header: non_empty(env::ANTI_FORGERY_HEADER, DEFAULT_ANTI_FORGERY_HEADER),
        }
    }
}
