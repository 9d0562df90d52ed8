//! Error types for Hearth routing
//!
//! `HearthError` is the single error type surfaced by the router. Per-attempt
//! failures (`Upstream`, `Timeout`, `Cancelled`, `DependencyUnavailable`) are
//! absorbed by the fallback loop and only reach the caller aggregated inside
//! `AllProvidersExhausted`.

mod constructors;
mod conversions;
mod types;

pub use types::{HearthError, HearthResult, ProviderAttempt};
