//! Circuit breaker implementation

use std::future::Future;
use std::time::Instant;

use parking_lot::Mutex;

use super::types::{
    CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, CircuitState, Decision,
};

/// Mutable circuit state, only ever touched under `CircuitBreaker::inner`
#[derive(Debug)]
struct CircuitInner {
    state: CircuitState,
    consecutive_failures: u32,
    last_opened_at: Option<Instant>,
    success_total: u64,
    failure_total: u64,
    times_opened: u64,
    /// Set while the single half-open probe runs; blocks the lazy
    /// open -> half-open transition so no second probe can start.
    probe_in_flight: bool,
}

impl CircuitInner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_opened_at: None,
            success_total: 0,
            failure_total: 0,
            times_opened: 0,
            probe_in_flight: false,
        }
    }
}

/// Circuit breaker for protecting against failing dependencies
///
/// The blocking (`call_blocking*`) and async (`call*`) surfaces both go through
/// [`CircuitBreaker::decide`], so they share one state machine. The lock is
/// never held while the protected operation runs.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Component name (for logging and metrics)
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<CircuitInner>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default config
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, CircuitBreakerConfig::default())
    }

    /// Create a new circuit breaker with custom config
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(CircuitInner::new()),
        }
    }

    /// Get the component name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Get the current state, applying the lazy open -> half-open transition
    pub fn state(&self) -> CircuitState {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);
        inner.state
    }

    /// Admission check shared by every call surface.
    ///
    /// A half-open circuit is flipped back to open before the lock is released,
    /// so exactly one caller receives [`Decision::Probe`].
    pub fn decide(&self) -> Decision {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);
        match inner.state {
            CircuitState::Closed => Decision::Pass,
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.probe_in_flight = true;
                tracing::debug!(circuit = %self.name, "Circuit breaker probe admitted");
                Decision::Probe
            }
            CircuitState::Open => Decision::Reject,
        }
    }

    /// Execute an operation with circuit breaker protection
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.decide() {
            Decision::Reject => Err(self.open_error()),
            decision => self.execute(decision, operation).await,
        }
    }

    /// Execute an operation, substituting `fallback` when the circuit is open
    /// or the operation fails. Fallback failures are returned unprotected.
    pub async fn call_with_fallback<T, E, F, Fut, G, GFut>(
        &self,
        operation: F,
        fallback: G,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        G: FnOnce() -> GFut,
        GFut: Future<Output = Result<T, E>>,
    {
        let outcome = match self.decide() {
            Decision::Reject => Err(self.open_error()),
            decision => self.execute(decision, operation).await,
        };
        match outcome {
            Ok(value) => Ok(value),
            Err(_) => fallback().await.map_err(CircuitBreakerError::FallbackFailed),
        }
    }

    /// Blocking counterpart of [`CircuitBreaker::call`]
    pub fn call_blocking<T, E, F>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        match self.decide() {
            Decision::Reject => Err(self.open_error()),
            decision => {
                let guard = PermitGuard::new(self, decision);
                let outcome = operation();
                guard.settle(outcome.is_ok());
                outcome.map_err(CircuitBreakerError::OperationFailed)
            }
        }
    }

    /// Blocking counterpart of [`CircuitBreaker::call_with_fallback`]
    pub fn call_blocking_with_fallback<T, E, F, G>(
        &self,
        operation: F,
        fallback: G,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        G: FnOnce() -> Result<T, E>,
    {
        match self.call_blocking(operation) {
            Ok(value) => Ok(value),
            Err(_) => fallback().map_err(CircuitBreakerError::FallbackFailed),
        }
    }

    /// Get circuit breaker statistics
    pub fn stats(&self) -> CircuitBreakerStats {
        let mut inner = self.inner.lock();
        self.refresh(&mut inner);
        CircuitBreakerStats {
            name: self.name.clone(),
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            success_total: inner.success_total,
            failure_total: inner.failure_total,
            times_opened: inner.times_opened,
            last_opened_at: inner.last_opened_at,
            probe_in_flight: inner.probe_in_flight,
            failure_threshold: self.config.failure_threshold,
            reset_delay: self.config.reset_delay,
        }
    }

    /// Manually reset the circuit breaker to closed state
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.probe_in_flight = false;
        tracing::info!(circuit = %self.name, "Circuit breaker manually reset");
    }

    /// Manually open the circuit breaker
    pub fn trip(&self) {
        let mut inner = self.inner.lock();
        self.transition_to_open(&mut inner);
    }

    async fn execute<T, E, F, Fut>(
        &self,
        decision: Decision,
        operation: F,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // Dropping this future mid-probe settles the probe as failed.
        let guard = PermitGuard::new(self, decision);
        let outcome = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, operation()).await {
                Ok(result) => result.map_err(CircuitBreakerError::OperationFailed),
                Err(_) => Err(CircuitBreakerError::Timeout {
                    component: self.name.clone(),
                    timeout: limit,
                }),
            },
            None => operation().await.map_err(CircuitBreakerError::OperationFailed),
        };
        guard.settle(outcome.is_ok());
        outcome
    }

    fn record(&self, decision: Decision, succeeded: bool) {
        let mut inner = self.inner.lock();
        match (decision, succeeded) {
            (Decision::Reject, _) => {}
            (Decision::Pass, true) => {
                inner.success_total += 1;
                if inner.state == CircuitState::Closed {
                    inner.consecutive_failures = 0;
                }
            }
            (Decision::Pass, false) => {
                inner.failure_total += 1;
                inner.consecutive_failures += 1;
                if inner.state == CircuitState::Closed
                    && inner.consecutive_failures >= self.config.failure_threshold
                {
                    self.transition_to_open(&mut inner);
                }
            }
            (Decision::Probe, true) => {
                inner.success_total += 1;
                inner.probe_in_flight = false;
                inner.consecutive_failures = 0;
                inner.state = CircuitState::Closed;
                tracing::info!(circuit = %self.name, "Circuit breaker closed after successful probe");
            }
            (Decision::Probe, false) => {
                inner.failure_total += 1;
                inner.consecutive_failures += 1;
                inner.probe_in_flight = false;
                self.transition_to_open(&mut inner);
            }
        }
    }

    fn refresh(&self, inner: &mut CircuitInner) {
        if inner.state != CircuitState::Open || inner.probe_in_flight {
            return;
        }
        if let Some(opened_at) = inner.last_opened_at {
            if opened_at.elapsed() >= self.config.reset_delay {
                inner.state = CircuitState::HalfOpen;
                tracing::info!(circuit = %self.name, "Circuit breaker transitioning to half-open");
            }
        }
    }

    fn transition_to_open(&self, inner: &mut CircuitInner) {
        inner.state = CircuitState::Open;
        inner.last_opened_at = Some(Instant::now());
        inner.times_opened += 1;

        tracing::warn!(
            circuit = %self.name,
            "Circuit breaker opened after {} consecutive failures",
            inner.consecutive_failures
        );
    }

    fn open_error<E>(&self) -> CircuitBreakerError<E> {
        CircuitBreakerError::Open {
            component: self.name.clone(),
        }
    }
}

/// Records the outcome of an admitted call exactly once.
///
/// An unsettled probe (future dropped, closure panicked) counts as a failed
/// probe so the circuit can never stay stuck with a probe marked in flight.
struct PermitGuard<'a> {
    breaker: &'a CircuitBreaker,
    decision: Decision,
    settled: bool,
}

impl<'a> PermitGuard<'a> {
    fn new(breaker: &'a CircuitBreaker, decision: Decision) -> Self {
        Self {
            breaker,
            decision,
            settled: false,
        }
    }

    fn settle(mut self, succeeded: bool) {
        self.settled = true;
        self.breaker.record(self.decision, succeeded);
    }
}

impl Drop for PermitGuard<'_> {
    fn drop(&mut self) {
        if !self.settled && self.decision == Decision::Probe {
            self.breaker.record(Decision::Probe, false);
        }
    }
}
