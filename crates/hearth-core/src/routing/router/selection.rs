use std::collections::HashSet;
use std::sync::Arc;

use super::{ProviderSlot, Router};
use crate::config::ProviderConfig;
use crate::routing::complexity::Complexity;
use crate::routing::request::{RouteRequest, RoutingDecision};

/// Context window at which a provider earns the complex-request bonus
pub const LARGE_CONTEXT_TOKENS: u32 = 32_000;

/// Sort key for a candidate provider, lower is better
///
/// Providers that suit the request's economics (free for simple requests,
/// large context for complex ones) form a preferred tier ahead of all others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RouteRank {
    pub tier: u8,
    pub adjusted_priority: i32,
}

impl RouteRank {
    pub fn for_provider(config: &ProviderConfig, complexity: Complexity) -> Self {
        let preferred = match complexity {
            Complexity::Simple => config.cost_per_1k_tokens == 0.0,
            Complexity::Complex => config.max_context_tokens >= LARGE_CONTEXT_TOKENS,
            Complexity::Medium => false,
        };
        if preferred {
            Self {
                tier: 0,
                adjusted_priority: config.priority - 1,
            }
        } else {
            Self {
                tier: 1,
                adjusted_priority: config.priority,
            }
        }
    }
}

struct Candidate {
    index: usize,
    rank: RouteRank,
    latency_ms: f64,
    config: Arc<ProviderConfig>,
}

impl Router {
    /// Best provider for `request`, or `None` when nothing is eligible
    pub fn choose_provider(&self, request: &RouteRequest) -> Option<RoutingDecision> {
        self.select(request, &HashSet::new(), true)
    }

    pub(super) fn select(
        &self,
        request: &RouteRequest,
        excluded: &HashSet<String>,
        honor_forced: bool,
    ) -> Option<RoutingDecision> {
        let slots = self.slots();
        let budget = request.token_budget();
        let complexity = self.classifier.classify(&request.prompt, budget);

        if honor_forced {
            if let Some(forced) = self.forced(&slots, request) {
                return Some(RoutingDecision {
                    provider: forced,
                    complexity,
                });
            }
        }

        let mut candidates: Vec<Candidate> = slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let config = slot.config();
                if !self.is_eligible(slot, &config, request, budget, excluded) {
                    return None;
                }
                Some(Candidate {
                    index,
                    rank: RouteRank::for_provider(&config, complexity),
                    latency_ms: slot.health.average_latency_ms(),
                    config,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then(a.latency_ms.total_cmp(&b.latency_ms))
                .then(a.index.cmp(&b.index))
        });

        let chosen = candidates.into_iter().next()?;
        tracing::debug!(
            provider = %chosen.config.id,
            complexity = %complexity,
            tier = chosen.rank.tier,
            adjusted_priority = chosen.rank.adjusted_priority,
            "Selected provider"
        );
        Some(RoutingDecision {
            provider: chosen.config,
            complexity,
        })
    }

    fn forced(&self, slots: &[Arc<ProviderSlot>], request: &RouteRequest) -> Option<Arc<ProviderConfig>> {
        let forced = request.forced_provider.as_deref()?;
        let config = slots
            .iter()
            .map(|slot| slot.config())
            .find(|config| config.id == forced);
        match config {
            Some(config) if config.enabled => Some(config),
            Some(_) => {
                tracing::debug!(provider = forced, "Forced provider is disabled, using normal selection");
                None
            }
            None => {
                tracing::warn!(provider = forced, "Forced provider is not registered, using normal selection");
                None
            }
        }
    }

    fn is_eligible(
        &self,
        slot: &ProviderSlot,
        config: &ProviderConfig,
        request: &RouteRequest,
        budget: u32,
        excluded: &HashSet<String>,
    ) -> bool {
        config.enabled
            && !excluded.contains(&config.id)
            && (slot.health.is_available() || slot.health.should_retest(self.retest_cooldown))
            && config
                .capabilities
                .satisfies(request.needs_vision, request.needs_json)
            && budget <= config.max_context_tokens
    }
}
