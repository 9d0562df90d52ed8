use std::collections::HashSet;
use std::future::Future;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::Router;
use crate::config::ProviderConfig;
use crate::error::{HearthError, HearthResult, ProviderAttempt};
use crate::routing::request::RouteRequest;

/// Bound one provider operation by the provider timeout and the request's
/// cancellation token
pub(super) async fn bounded<T, Fut>(
    provider: &ProviderConfig,
    cancel: Option<&CancellationToken>,
    operation: Fut,
) -> HearthResult<T>
where
    Fut: Future<Output = HearthResult<T>>,
{
    let limited = tokio::time::timeout(provider.timeout(), operation);
    let outcome = match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => return Err(HearthError::Cancelled),
            outcome = limited => outcome,
        },
        None => limited.await,
    };
    outcome.unwrap_or_else(|_| Err(HearthError::timeout(&provider.id, provider.timeout_secs)))
}

impl Router {
    /// Route `request` with automatic fallback and return the response text
    ///
    /// Up to `max_fallbacks + 1` providers are attempted in order of
    /// preference; each is tried at most once. When every attempt fails the
    /// error lists each provider and what it returned. The quota is consulted
    /// before every dispatch, fallbacks included.
    #[instrument(skip(self, request), fields(forced = ?request.forced_provider))]
    pub async fn call(&self, request: &RouteRequest) -> HearthResult<String> {
        self.admit()?;
        self.check_forced(request)?;

        let max_attempts = self.effective_max_fallbacks(request.max_fallbacks) + 1;
        let mut excluded = HashSet::new();
        let mut attempts: Vec<ProviderAttempt> = Vec::new();

        for attempt in 0..max_attempts {
            if request.is_cancelled() {
                tracing::debug!("Request cancelled, no further attempts");
                if attempts.is_empty() {
                    return Err(HearthError::Cancelled);
                }
                break;
            }
            let Some(decision) = self.select(request, &excluded, attempt == 0) else {
                tracing::debug!(attempt, "No eligible provider left");
                break;
            };
            let provider = decision.provider;
            if attempt > 0 && !self.quota.can_call() {
                tracing::warn!(provider = %provider.id, attempt, "Call quota exhausted, no further attempts");
                let refused = HearthError::rate_limited("Call quota exhausted");
                attempts.push(ProviderAttempt::new(provider.id.clone(), refused.to_string()));
                break;
            }
            let Some(slot) = self.slot(&provider.id) else {
                break;
            };

            let chat = request.to_chat_request(&provider);
            let started = Instant::now();
            let outcome = bounded(
                &provider,
                request.cancel.as_ref(),
                self.transport.complete(&provider, &chat),
            )
            .await;

            match outcome {
                Ok(text) => {
                    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                    slot.health.record_success(latency_ms);
                    self.quota
                        .record_call(&provider.id, request.estimate_tokens(&text));
                    if attempt > 0 {
                        tracing::info!(
                            provider = %provider.id,
                            attempt,
                            latency_ms,
                            "Fallback provider succeeded"
                        );
                    } else {
                        tracing::info!(provider = %provider.id, latency_ms, "Provider call succeeded");
                    }
                    return Ok(text);
                }
                Err(error) => {
                    slot.health.record_failure();
                    tracing::warn!(
                        provider = %provider.id,
                        attempt,
                        error = %error,
                        "Provider attempt failed"
                    );
                    excluded.insert(provider.id.clone());
                    attempts.push(ProviderAttempt::new(provider.id.clone(), error.to_string()));
                }
            }
        }

        tracing::warn!(attempts = attempts.len(), "All providers exhausted");
        Err(HearthError::exhausted(attempts))
    }

    /// Pre-dispatch checks shared by every entrypoint
    pub(super) fn admit(&self) -> HearthResult<()> {
        if !self.quota.can_call() {
            return Err(HearthError::rate_limited("Call quota exhausted"));
        }
        if self.is_empty() {
            return Err(HearthError::config("No providers registered"));
        }
        Ok(())
    }

    /// A forced provider must at least be registered; a disabled one is
    /// skipped by selection instead
    pub(super) fn check_forced(&self, request: &RouteRequest) -> HearthResult<()> {
        match request.forced_provider.as_deref() {
            Some(id) if self.slot(id).is_none() => Err(HearthError::config_with_context(
                format!("Unknown forced provider '{}'", id),
                format!("Registered providers: {}", self.provider_ids().join(", ")),
            )),
            _ => Ok(()),
        }
    }
}
