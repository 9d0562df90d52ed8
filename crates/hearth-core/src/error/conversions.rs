//! From trait implementations for HearthError conversions

use super::types::HearthError;
use crate::recovery::circuit_breaker::CircuitBreakerError;

impl From<std::io::Error> for HearthError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for HearthError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<toml::de::Error> for HearthError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_context(
            format!("Failed to parse TOML config: {}", error),
            "Deserializing TOML configuration",
        )
    }
}

impl From<reqwest::Error> for HearthError {
    fn from(error: reqwest::Error) -> Self {
        let provider = error
            .url()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        Self::Upstream {
            provider,
            message: error.to_string(),
            status_code: error.status().map(|s| s.as_u16()),
        }
    }
}

impl From<CircuitBreakerError<HearthError>> for HearthError {
    fn from(error: CircuitBreakerError<HearthError>) -> Self {
        match error {
            CircuitBreakerError::Open { component } => Self::dependency_unavailable(component),
            CircuitBreakerError::Timeout { component, timeout } => {
                // Round up: a sub-second breaker timeout must not read as 0s
                let seconds = u64::try_from(timeout.as_millis().div_ceil(1000)).unwrap_or(u64::MAX);
                Self::timeout(component, seconds)
            }
            CircuitBreakerError::OperationFailed(inner) | CircuitBreakerError::FallbackFailed(inner) => {
                inner
            }
        }
    }
}
