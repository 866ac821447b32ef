//! Circuit breaker guarding the scoring call.
//!
//! # States
//!
//! - **Closed**: normal operation, requests pass through
//! - **Open**: the service is misbehaving, requests fail fast
//! - **HalfOpen**: after the open timeout, a single probe is allowed
//!
//! Combined with the outer timeout in [`GuardedScorer`], this keeps a slow or
//! dead scoring service from dragging the proposal-intake request path down
//! with it.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::{Campaign, Creator, ScoreReport};

use super::{Scorer, ScoringError};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Configuration for the circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before allowing a probe.
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(30),
        }
    }
}

struct Internal {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
}

/// Circuit breaker for an external service call.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<Internal>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(Internal {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
            }),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state.lock().unwrap().state
    }

    /// Whether a call may proceed. In HalfOpen, only the caller that flipped
    /// the state gets through; others keep failing fast until the probe
    /// resolves.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let expired = state
                    .opened_at
                    .is_some_and(|at| at.elapsed() >= self.config.open_timeout);
                if expired {
                    state.state = CircuitState::HalfOpen;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => false,
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock().unwrap();
        state.state = CircuitState::Closed;
        state.failure_count = 0;
        state.opened_at = None;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock().unwrap();
        match state.state {
            CircuitState::HalfOpen => {
                state.state = CircuitState::Open;
                state.opened_at = Some(Instant::now());
            }
            CircuitState::Closed => {
                state.failure_count += 1;
                if state.failure_count >= self.config.failure_threshold {
                    state.state = CircuitState::Open;
                    state.opened_at = Some(Instant::now());
                }
            }
            CircuitState::Open => {}
        }
    }
}

/// Scorer wrapper adding a hard timeout and the circuit breaker.
///
/// The inner scorer may carry its own transport-level timeout; this is the
/// outer bound the request path relies on.
pub struct GuardedScorer<S> {
    inner: S,
    breaker: CircuitBreaker,
    timeout: Duration,
}

impl<S> GuardedScorer<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self::with_breaker(inner, timeout, CircuitBreaker::new(Default::default()))
    }

    pub fn with_breaker(inner: S, timeout: Duration, breaker: CircuitBreaker) -> Self {
        Self {
            inner,
            breaker,
            timeout,
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

#[async_trait]
impl<S: Scorer> Scorer for GuardedScorer<S> {
    async fn evaluate(
        &self,
        pitch: &str,
        campaign: &Campaign,
        creator: &Creator,
    ) -> Result<ScoreReport, ScoringError> {
        if !self.breaker.try_acquire() {
            return Err(ScoringError::Unavailable("circuit open"));
        }

        match tokio::time::timeout(self.timeout, self.inner.evaluate(pitch, campaign, creator))
            .await
        {
            Ok(Ok(report)) => {
                self.breaker.record_success();
                Ok(report)
            }
            Ok(Err(e)) => {
                self.breaker.record_failure();
                Err(e)
            }
            Err(_) => {
                self.breaker.record_failure();
                Err(ScoringError::Timeout(self.timeout))
            }
        }
    }
}
