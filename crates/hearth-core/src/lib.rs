//! Hearth core: AI request routing and resilience
//!
//! Picks an upstream provider for each request, fails over to the next best
//! one when it errors, and guards providers with circuit breakers.

pub mod config;
pub mod error;
pub mod llm;
pub mod recovery;
pub mod routing;

pub use config::{HearthConfig, ProviderCapabilities, ProviderConfig, ProviderPatch};
pub use error::{HearthError, HearthResult, ProviderAttempt};
pub use llm::{ChatTransport, CircuitTransport, HttpTransport, TextStream};
pub use recovery::{CircuitBreaker, CircuitBreakerConfig, CircuitRegistry, CircuitState};
pub use routing::{
    CallQuota, Complexity, ComplexityClassifier, ProviderStatus, RouteRequest, Router,
    RoutingDecision, UnlimitedQuota,
};
