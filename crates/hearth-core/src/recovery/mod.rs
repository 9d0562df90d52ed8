//! Failure isolation for upstream dependencies

pub mod circuit_breaker;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitRegistry, CircuitState,
};
