//! Core error types for Hearth routing

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Hearth operations
pub type HearthResult<T> = Result<T, HearthError>;

/// One failed provider attempt inside a routed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderAttempt {
    /// Provider id that was tried
    pub provider: String,
    /// The specific error that provider returned
    pub error: String,
}

impl ProviderAttempt {
    pub fn new(provider: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            error: error.into(),
        }
    }
}

impl std::fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

fn describe_attempts(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no eligible provider".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for Hearth routing
///
/// Every variant carries enough detail to be shown to an end user as-is; the
/// exhaustion variant in particular lists each provider that was attempted.
#[derive(Error, Debug, Clone)]
pub enum HearthError {
    /// A circuit breaker is open and no fallback was supplied
    #[error("Dependency unavailable: circuit '{dependency}' is open")]
    DependencyUnavailable { dependency: String },

    /// Every candidate provider failed, or none was eligible
    #[error("All providers exhausted ({}): {}", .attempts.len(), describe_attempts(.attempts))]
    AllProvidersExhausted { attempts: Vec<ProviderAttempt> },

    /// Quota check refused the call before dispatch
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// One provider attempt failed at the transport or HTTP level
    #[error("Upstream error from '{provider}': {message}")]
    Upstream {
        provider: String,
        message: String,
        status_code: Option<u16>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        context: Option<String>,
    },

    /// A provider attempt exceeded its timeout
    #[error("Request to '{provider}' timed out after {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    /// The caller cancelled the request
    #[error("Request was cancelled")]
    Cancelled,

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },
}

impl HearthError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DependencyUnavailable { .. } => "HEARTH_DEPENDENCY_UNAVAILABLE",
            Self::AllProvidersExhausted { .. } => "HEARTH_ALL_PROVIDERS_EXHAUSTED",
            Self::RateLimited { .. } => "HEARTH_RATE_LIMITED",
            Self::Upstream { .. } => "HEARTH_UPSTREAM",
            Self::Configuration { .. } => "HEARTH_CONFIGURATION",
            Self::Timeout { .. } => "HEARTH_TIMEOUT",
            Self::Cancelled => "HEARTH_CANCELLED",
            Self::Io { .. } => "HEARTH_IO",
            Self::Json { .. } => "HEARTH_JSON",
        }
    }

    /// Whether retrying the same operation later could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::DependencyUnavailable { .. }
            | Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::AllProvidersExhausted { .. } => true,
            Self::Upstream { status_code, .. } => match status_code {
                Some(code) => *code == 429 || *code >= 500,
                None => true,
            },
            Self::Configuration { .. } | Self::Cancelled | Self::Io { .. } | Self::Json { .. } => {
                false
            }
        }
    }

    /// Attempts carried by an exhaustion error, empty for every other variant
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            Self::AllProvidersExhausted { attempts } => attempts,
            _ => &[],
        }
    }
}
