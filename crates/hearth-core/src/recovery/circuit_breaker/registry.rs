//! Circuit breaker registry for managing multiple circuit breakers

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::breaker::CircuitBreaker;
use super::types::{CircuitBreakerConfig, CircuitBreakerStats};

/// Named collection of circuit breakers
///
/// Lookups go through the sharded map without touching the creation lock;
/// only a miss takes `create_lock` to insert. The first registration of a
/// name wins: later calls with different thresholds get the existing breaker.
pub struct CircuitRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    create_lock: Mutex<()>,
    default_config: CircuitBreakerConfig,
}

impl CircuitRegistry {
    /// Create a new registry with default config
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    /// Create a registry with custom default config
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            breakers: DashMap::new(),
            create_lock: Mutex::new(()),
            default_config: config,
        }
    }

    pub fn default_config(&self) -> &CircuitBreakerConfig {
        &self.default_config
    }

    /// Get or create a breaker with explicit thresholds
    pub fn get_or_create(
        &self,
        name: &str,
        failure_threshold: u32,
        reset_delay: Duration,
    ) -> Arc<CircuitBreaker> {
        let config = CircuitBreakerConfig {
            failure_threshold,
            reset_delay,
            timeout: self.default_config.timeout,
        };
        self.get_with_config(name, config)
    }

    /// Get or create a circuit breaker using the registry defaults
    pub fn get(&self, name: &str) -> Arc<CircuitBreaker> {
        self.get_with_config(name, self.default_config.clone())
    }

    /// Get or create with custom config
    pub fn get_with_config(&self, name: &str, config: CircuitBreakerConfig) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.lookup(name) {
            return existing;
        }

        let _guard = self.create_lock.lock();
        // Double-check after acquiring the creation lock
        if let Some(existing) = self.lookup(name) {
            return existing;
        }

        tracing::debug!(
            circuit = %name,
            failure_threshold = config.failure_threshold,
            reset_delay_ms = config.reset_delay.as_millis() as u64,
            "Registering circuit breaker"
        );
        let breaker = Arc::new(CircuitBreaker::with_config(name, config));
        self.breakers.insert(name.to_string(), Arc::clone(&breaker));
        breaker
    }

    /// Look up an existing breaker without creating one
    pub fn lookup(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Get all circuit breaker names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Get stats for all circuit breakers, sorted by name
    pub fn all_stats(&self) -> Vec<CircuitBreakerStats> {
        let mut stats: Vec<CircuitBreakerStats> =
            self.breakers.iter().map(|e| e.value().stats()).collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    /// Reset all circuit breakers
    pub fn reset_all(&self) {
        for entry in self.breakers.iter() {
            entry.value().reset();
        }
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}

impl Default for CircuitRegistry {
    fn default() -> Self {
        Self::new()
    }
}
