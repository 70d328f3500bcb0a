use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::errors::HttpError;
use crate::errors::Result;

/// State of the circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, requests pass through
    Closed,
    /// Circuit is open, requests are rejected
    Open,
    /// Cooldown elapsed, a single probing request is allowed
    HalfOpen,
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Failures within the window needed to open the circuit
    pub failure_threshold: u32,

    /// Failures further apart than this restart the count
    pub failure_window: Duration,

    /// How long the circuit stays open before a probe is allowed
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 3, failure_window: Duration::from_millis(10_000), cooldown: Duration::from_millis(15_000) }
    }
}

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
    is_open: bool,
    next_attempt_time: Option<Instant>,
    trial_in_flight: bool,
}

/// How a call was let through the breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Normal,
    Trial,
}

/// Circuit breaker guarding the calls of one client
///
/// Opens after `failure_threshold` failures that are each within
/// `failure_window` of the previous one, rejects calls for `cooldown`,
/// then admits one probe whose outcome closes or re-opens the circuit.
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default configuration
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    /// Create a new circuit breaker with custom configuration
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self { state: Mutex::new(BreakerState::default()), config }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Run `f` through the breaker
    ///
    /// Fails fast with [`HttpError::CircuitBreakerOpen`] without invoking `f`
    /// while the circuit is open. Errors from `f` are returned unchanged.
    pub async fn execute<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let admission = self.admit()?;
        let mut guard = TrialGuard { breaker: self, armed: admission == Admission::Trial };

        let outcome = f().await;
        guard.armed = false;

        match outcome {
            Ok(value) => {
                self.record_success(admission);
                Ok(value)
            }
            Err(err) => {
                self.record_failure(admission);
                Err(err)
            }
        }
    }

    /// Get the current state of the circuit
    pub fn current_state(&self) -> CircuitState {
        let state = self.state.lock();

        if !state.is_open {
            return CircuitState::Closed;
        }

        let cooled_down = state.next_attempt_time.is_none_or(|next| Instant::now() >= next);
        if state.trial_in_flight || cooled_down { CircuitState::HalfOpen } else { CircuitState::Open }
    }

    /// Get current statistics
    pub fn stats(&self) -> CircuitBreakerStats {
        let circuit = self.current_state();
        let state = self.state.lock();

        CircuitBreakerStats {
            state: circuit,
            failure_count: state.failure_count,
            retry_in: state.next_attempt_time.filter(|_| state.is_open).map(|next| next.saturating_duration_since(Instant::now())),
        }
    }

    /// Force the circuit closed and forget recorded failures
    pub fn reset(&self) {
        *self.state.lock() = BreakerState::default();
    }

    fn admit(&self) -> Result<Admission> {
        let mut state = self.state.lock();

        if !state.is_open {
            return Ok(Admission::Normal);
        }

        if state.trial_in_flight {
            return Err(HttpError::CircuitBreakerOpen);
        }

        match state.next_attempt_time {
            Some(next) if Instant::now() < next => Err(HttpError::CircuitBreakerOpen),
            _ => {
                state.trial_in_flight = true;
                tracing::debug!("Circuit breaker half-open, admitting probe");
                Ok(Admission::Trial)
            }
        }
    }

    fn record_success(&self, admission: Admission) {
        let mut state = self.state.lock();

        match admission {
            Admission::Trial => {
                *state = BreakerState::default();
                tracing::info!("Circuit breaker closed after successful probe");
            }
            // A late success from before the circuit opened does not close it
            Admission::Normal if state.is_open => {}
            Admission::Normal => {
                state.failure_count = 0;
            }
        }
    }

    fn record_failure(&self, admission: Admission) {
        let mut state = self.state.lock();
        let now = Instant::now();

        match admission {
            Admission::Trial => {
                state.trial_in_flight = false;
                state.last_failure_time = Some(now);
                state.next_attempt_time = Some(now + self.config.cooldown);
                tracing::warn!(cooldown_ms = self.config.cooldown.as_millis() as u64, "Circuit breaker probe failed, re-opening");
            }
            Admission::Normal if state.is_open => {}
            Admission::Normal => {
                let within_window = state.last_failure_time.is_some_and(|last| now.duration_since(last) <= self.config.failure_window);
                state.failure_count = if within_window { state.failure_count.saturating_add(1) } else { 1 };
                state.last_failure_time = Some(now);

                if state.failure_count >= self.config.failure_threshold.max(1) {
                    state.is_open = true;
                    state.next_attempt_time = Some(now + self.config.cooldown);
                    tracing::warn!(
                        failures = state.failure_count,
                        cooldown_ms = self.config.cooldown.as_millis() as u64,
                        "Circuit breaker opened"
                    );
                }
            }
        }
    }

    fn release_trial(&self) {
        self.state.lock().trial_in_flight = false;
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Frees the probe slot if a trial call is dropped before it completes
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.release_trial();
        }
    }
}

/// Statistics about circuit breaker state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
    /// Time left until a probe is allowed, while open
    pub retry_in: Option<Duration>,
}
