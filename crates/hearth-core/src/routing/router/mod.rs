//! Provider router with bounded automatic fallback
//!
//! The router owns the provider table and one health tracker per provider.
//! Each call selects the best eligible provider, and on failure moves on to
//! the next best one, never retrying a provider within the same call.

mod call;
mod diagnostics;
mod selection;
mod streaming;


pub use diagnostics::ProviderStatus;
pub use selection::RouteRank;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use super::complexity::ComplexityClassifier;
use super::health::{HealthSnapshot, ProviderHealthTracker, DEFAULT_RETEST_COOLDOWN};
use super::quota::{CallQuota, UnlimitedQuota};
use crate::config::{HearthConfig, ProviderConfig, ProviderPatch};
use crate::error::{HearthError, HearthResult};
use crate::llm::ChatTransport;

/// Fallbacks allowed when a request does not say otherwise
pub const DEFAULT_MAX_FALLBACKS: u32 = 2;

/// Registered provider: swappable config plus its health
struct ProviderSlot {
    config: RwLock<Arc<ProviderConfig>>,
    health: ProviderHealthTracker,
}

impl ProviderSlot {
    fn new(config: ProviderConfig) -> Self {
        Self {
            config: RwLock::new(Arc::new(config)),
            health: ProviderHealthTracker::new(),
        }
    }

    fn config(&self) -> Arc<ProviderConfig> {
        self.config.read().clone()
    }
}

/// Routes requests to providers through a [`ChatTransport`]
pub struct Router {
    /// Registration order is the final tie-breaker
    providers: RwLock<Vec<Arc<ProviderSlot>>>,
    transport: Arc<dyn ChatTransport>,
    quota: Arc<dyn CallQuota>,
    classifier: ComplexityClassifier,
    retest_cooldown: Duration,
    max_fallbacks: u32,
}

impl Router {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
            transport,
            quota: Arc::new(UnlimitedQuota),
            classifier: ComplexityClassifier::new(),
            retest_cooldown: DEFAULT_RETEST_COOLDOWN,
            max_fallbacks: DEFAULT_MAX_FALLBACKS,
        }
    }

    /// Router with every provider and routing setting from `config`
    pub fn from_config(config: &HearthConfig, transport: Arc<dyn ChatTransport>) -> Self {
        let router = Self::new(transport)
            .with_retest_cooldown(config.routing.retest_cooldown())
            .with_max_fallbacks(config.routing.max_fallbacks);
        for provider in &config.providers {
            router.register(provider.clone());
        }
        router
    }

    pub fn with_quota(mut self, quota: Arc<dyn CallQuota>) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_classifier(mut self, classifier: ComplexityClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_retest_cooldown(mut self, cooldown: Duration) -> Self {
        self.retest_cooldown = cooldown;
        self
    }

    pub fn with_max_fallbacks(mut self, max_fallbacks: u32) -> Self {
        self.max_fallbacks = max_fallbacks;
        self
    }

    pub fn classifier(&self) -> &ComplexityClassifier {
        &self.classifier
    }

    /// Register a provider; an existing id has its config replaced in place
    pub fn register(&self, config: ProviderConfig) {
        let mut providers = self.providers.write();
        if let Some(slot) = providers.iter().find(|s| s.config.read().id == config.id) {
            tracing::info!(provider = %config.id, "Replacing provider configuration");
            *slot.config.write() = Arc::new(config);
            return;
        }
        tracing::debug!(provider = %config.id, priority = config.priority, "Registered provider");
        providers.push(Arc::new(ProviderSlot::new(config)));
    }

    /// Hot-patch a provider; readers holding the old snapshot are unaffected
    pub fn activate_provider(
        &self,
        id: &str,
        patch: &ProviderPatch,
    ) -> HearthResult<Arc<ProviderConfig>> {
        let slot = self
            .slot(id)
            .ok_or_else(|| HearthError::config(format!("Unknown provider '{}'", id)))?;

        let mut current = slot.config.write();
        let next = Arc::new(patch.apply(&current));
        *current = next.clone();
        tracing::info!(
            provider = id,
            enabled = next.enabled,
            model = %next.model_id,
            "Provider configuration patched"
        );
        Ok(next)
    }

    pub fn provider(&self, id: &str) -> Option<Arc<ProviderConfig>> {
        self.slot(id).map(|slot| slot.config())
    }

    /// Ids in registration order
    pub fn provider_ids(&self) -> Vec<String> {
        self.slots().iter().map(|slot| slot.config().id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    pub fn health(&self, id: &str) -> Option<HealthSnapshot> {
        self.slot(id).map(|slot| slot.health.snapshot())
    }

    /// Forget a provider's health history; false if the id is unknown
    pub fn reset_health(&self, id: &str) -> bool {
        match self.slot(id) {
            Some(slot) => {
                slot.health.reset();
                tracing::info!(provider = id, "Provider health reset");
                true
            }
            None => false,
        }
    }

    fn slots(&self) -> Vec<Arc<ProviderSlot>> {
        self.providers.read().clone()
    }

    fn slot(&self, id: &str) -> Option<Arc<ProviderSlot>> {
        self.providers
            .read()
            .iter()
            .find(|slot| slot.config.read().id == id)
            .cloned()
    }

    fn effective_max_fallbacks(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.max_fallbacks)
    }
}
