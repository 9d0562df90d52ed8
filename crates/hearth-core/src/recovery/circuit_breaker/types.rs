//! Circuit breaker types and configuration

use std::time::{Duration, Instant};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Circuit is closed, operations proceed normally
    Closed,
    /// Circuit is open, operations are rejected
    Open,
    /// Reset delay elapsed, the next caller becomes the single probe
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Outcome of the non-blocking admission check shared by every call surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Circuit closed: run the operation normally
    Pass,
    /// This caller won the probe; the circuit reads as open for everyone else
    Probe,
    /// Circuit open: take the fallback or fail
    Reject,
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening the circuit
    pub failure_threshold: u32,
    /// Time to wait before an open circuit admits a probe
    pub reset_delay: Duration,
    /// Upper bound for a single protected operation (async surface only)
    pub timeout: Option<Duration>,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_delay: Duration::from_secs(30),
            timeout: None,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new(failure_threshold: u32, reset_delay: Duration) -> Self {
        Self {
            failure_threshold,
            reset_delay,
            timeout: None,
        }
    }

    /// Create a config for aggressive circuit breaking
    pub fn aggressive() -> Self {
        Self {
            failure_threshold: 3,
            reset_delay: Duration::from_secs(15),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Error from circuit breaker operations
#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open and no fallback was supplied
    Open { component: String },
    /// The protected operation exceeded the breaker timeout
    Timeout { component: String, timeout: Duration },
    /// Operation failed
    OperationFailed(E),
    /// The caller-supplied fallback failed
    FallbackFailed(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { component } => {
                write!(f, "Circuit breaker open for component: {}", component)
            }
            Self::Timeout { component, timeout } => write!(
                f,
                "Operation on {} timed out after {}ms",
                component,
                timeout.as_millis()
            ),
            Self::OperationFailed(e) => write!(f, "Operation failed: {}", e),
            Self::FallbackFailed(e) => write!(f, "Fallback failed: {}", e),
        }
    }
}

impl<E: std::error::Error> std::error::Error for CircuitBreakerError<E> {}

/// Coherent snapshot of a circuit breaker, read under its lock
#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub name: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub success_total: u64,
    pub failure_total: u64,
    /// Number of transitions into the open state
    pub times_opened: u64,
    pub last_opened_at: Option<Instant>,
    pub probe_in_flight: bool,
    pub failure_threshold: u32,
    pub reset_delay: Duration,
}

impl CircuitBreakerStats {
    /// Calculate failure rate as a percentage
    pub fn failure_rate(&self) -> f64 {
        let total = self.success_total + self.failure_total;
        if total == 0 {
            0.0
        } else {
            (self.failure_total as f64 / total as f64) * 100.0
        }
    }
}
