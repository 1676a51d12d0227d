//! # Circuit Breaker Module
//!
//! Stops calling the encoder for a while after it has failed repeatedly, so a
//! broken encoder fails fast instead of tying up a blocking thread per
//! request.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker for encode operations
///
/// # State Machine
///
/// - **Closed**: Normal operation, requests pass through
/// - **Open**: Failure threshold exceeded, requests fail fast
/// - **Half-Open**: Reset timeout elapsed, requests are let through again.
///   The first failure re-opens the breaker, the first success closes it.
///
/// # Configuration
///
/// Uses `RecoveryConfig` for:
/// - `circuit_breaker_threshold`: Failures before opening (default: 5)
/// - `circuit_breaker_reset`: Time before attempting reset (default: 60s)
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use qrcolor::config::RecoveryConfig;
    /// use qrcolor::circuit_breaker::CircuitBreaker;
    ///
    /// let breaker = CircuitBreaker::new(RecoveryConfig::default());
    /// assert!(!breaker.is_open());
    /// ```
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    /// `true` while the failure threshold is reached and the reset timeout
    /// has not elapsed since the last failure.
    pub fn is_open(&self) -> bool {
        let state = self.lock();
        self.tripped(&state) && !self.cooled_down(&state)
    }

    /// Threshold reached but the reset timeout has elapsed. The failure count
    /// is kept, so one more failure opens the breaker again.
    pub fn is_half_open(&self) -> bool {
        let state = self.lock();
        self.tripped(&state) && self.cooled_down(&state)
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.failure_count += 1;
        state.last_failure = Some(Instant::now());
    }

    pub fn record_success(&self) {
        *self.lock() = BreakerState::default();
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    fn tripped(&self, state: &BreakerState) -> bool {
        state.failure_count >= self.config.circuit_breaker_threshold
    }

    fn cooled_down(&self, state: &BreakerState) -> bool {
        state
            .last_failure
            .map_or(true, |last| last.elapsed() >= self.config.circuit_breaker_reset)
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
