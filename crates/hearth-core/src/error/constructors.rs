//! Constructor methods for HearthError

use super::types::{HearthError, ProviderAttempt};

impl HearthError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create an upstream error for one provider attempt
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Create an upstream error carrying the HTTP status
    pub fn upstream_status(
        provider: impl Into<String>,
        status_code: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    pub fn dependency_unavailable(dependency: impl Into<String>) -> Self {
        Self::DependencyUnavailable {
            dependency: dependency.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn exhausted(attempts: Vec<ProviderAttempt>) -> Self {
        Self::AllProvidersExhausted { attempts }
    }

    pub fn timeout(provider: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            provider: provider.into(),
            seconds,
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    /// Create an IO error with the offending path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }
}
