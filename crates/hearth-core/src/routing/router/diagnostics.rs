use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::instrument;

use super::call::bounded;
use super::{ProviderSlot, Router};
use crate::config::ProviderCapabilities;
use crate::llm::{ChatMessage, ChatRequest};

const PROBE_PROMPT: &str = "ping";

/// Diagnostic view of one provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub id: String,
    pub model_id: String,
    pub enabled: bool,
    pub priority: i32,
    pub cost_per_1k_tokens: f64,
    pub capabilities: ProviderCapabilities,
    pub max_context_tokens: u32,
    pub available: bool,
    pub consecutive_errors: u32,
    pub average_latency_ms: f64,
    pub latency_samples: usize,
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Whether selection would currently consider this provider
    pub would_route: bool,
}

impl Router {
    /// Snapshot of every provider in registration order
    pub fn status(&self) -> Vec<ProviderStatus> {
        self.slots()
            .iter()
            .map(|slot| {
                let config = slot.config();
                let health = slot.health.snapshot();
                let would_route = config.enabled
                    && (health.available || slot.health.should_retest(self.retest_cooldown));
                ProviderStatus {
                    id: config.id.clone(),
                    model_id: config.model_id.clone(),
                    enabled: config.enabled,
                    priority: config.priority,
                    cost_per_1k_tokens: config.cost_per_1k_tokens,
                    capabilities: config.capabilities,
                    max_context_tokens: config.max_context_tokens,
                    available: health.available,
                    consecutive_errors: health.consecutive_errors,
                    average_latency_ms: health.average_latency_ms,
                    latency_samples: health.samples,
                    last_checked_at: health.last_checked_at,
                    would_route,
                }
            })
            .collect()
    }

    /// Send one minimal request to every enabled provider, concurrently
    ///
    /// Each probe is a real call: it counts against the quota and updates
    /// the provider's health.
    #[instrument(skip(self))]
    pub async fn check_availability(&self) -> BTreeMap<String, bool> {
        let probes = self
            .slots()
            .into_iter()
            .filter(|slot| slot.config().enabled)
            .map(|slot| self.probe(slot));

        join_all(probes).await.into_iter().collect()
    }

    async fn probe(&self, slot: Arc<ProviderSlot>) -> (String, bool) {
        let config = slot.config();
        if !self.quota.can_call() {
            tracing::warn!(provider = %config.id, "Availability probe skipped: quota exhausted");
            return (config.id.clone(), false);
        }

        let chat = ChatRequest::new(vec![ChatMessage::user(PROBE_PROMPT)], 0.0, 1);
        let started = Instant::now();
        let outcome = bounded(&config, None, self.transport.complete(&config, &chat)).await;

        let ok = match outcome {
            Ok(text) => {
                slot.health
                    .record_success(started.elapsed().as_secs_f64() * 1000.0);
                let tokens = u32::try_from((PROBE_PROMPT.len() + text.chars().count()) / 4)
                    .unwrap_or(u32::MAX);
                self.quota.record_call(&config.id, tokens);
                true
            }
            Err(error) => {
                slot.health.record_failure();
                tracing::warn!(provider = %config.id, error = %error, "Availability probe failed");
                false
            }
        };
        (config.id.clone(), ok)
    }
}
