//! Top-level configuration model

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::provider::ProviderConfig;
use crate::recovery::CircuitBreakerConfig;
use crate::routing::health::DEFAULT_RETEST_COOLDOWN;

/// Upper bound accepted for `max_fallbacks`
pub const MAX_FALLBACKS_LIMIT: u32 = 10;

/// Routing behaviour shared by every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// Additional providers tried after the first one fails
    pub max_fallbacks: u32,
    /// Seconds before an unavailable provider is tried again
    pub retest_cooldown_secs: u64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            max_fallbacks: 2,
            retest_cooldown_secs: DEFAULT_RETEST_COOLDOWN.as_secs(),
        }
    }
}

impl RoutingSettings {
    pub fn retest_cooldown(&self) -> Duration {
        Duration::from_secs(self.retest_cooldown_secs)
    }
}

/// Per-provider circuit breakers wrapped around the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitSettings {
    pub enabled: bool,
    pub failure_threshold: u32,
    pub reset_delay_secs: u64,
    /// 0 disables the breaker-level timeout
    pub timeout_secs: u64,
}

impl Default for CircuitSettings {
    fn default() -> Self {
        let defaults = CircuitBreakerConfig::default();
        Self {
            enabled: false,
            failure_threshold: defaults.failure_threshold,
            reset_delay_secs: defaults.reset_delay.as_secs(),
            timeout_secs: 0,
        }
    }
}

impl CircuitSettings {
    pub fn breaker_config(&self) -> CircuitBreakerConfig {
        let config = CircuitBreakerConfig::new(
            self.failure_threshold,
            Duration::from_secs(self.reset_delay_secs),
        );
        if self.timeout_secs > 0 {
            config.with_timeout(Duration::from_secs(self.timeout_secs))
        } else {
            config
        }
    }
}

/// Whole `hearth.toml` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HearthConfig {
    pub routing: RoutingSettings,
    pub circuit: CircuitSettings,
    pub providers: Vec<ProviderConfig>,
}

impl HearthConfig {
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == id)
    }
}
