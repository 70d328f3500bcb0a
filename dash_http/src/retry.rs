use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry settings for a single operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub retries: u32,

    /// Base of the exponential backoff
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { retries: 3, base_delay: Duration::from_millis(300) }
    }
}

impl RetryConfig {
    /// A single attempt, no retries
    pub fn none() -> Self {
        Self { retries: 1, base_delay: Duration::ZERO }
    }

    /// Attempts actually made, at least one
    pub fn attempts(&self) -> u32 {
        self.retries.max(1)
    }
}

/// Delay slept after failed attempt `attempt` (1-indexed): `base * 2^attempt`
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Run `op` until it succeeds or the attempts are used up
///
/// Returns the error of the last attempt. Keeps no state between calls.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = config.attempts();
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => {
                tracing::warn!(attempt, attempts, error = %err, "Final attempt failed");
                return Err(err);
            }
            Err(err) => {
                let delay = backoff_delay(config.base_delay, attempt);
                tracing::warn!(attempt, attempts, delay_ms = delay.as_millis() as u64, error = %err, "Attempt failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
