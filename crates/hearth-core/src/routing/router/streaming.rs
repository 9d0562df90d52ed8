use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::call::bounded;
use super::{ProviderSlot, Router};
use crate::config::ProviderConfig;
use crate::error::{HearthError, HearthResult};
use crate::llm::{ChatRequest, ChatTransport, TextStream};
use crate::routing::quota::CallQuota;
use crate::routing::request::RouteRequest;

enum Phase {
    Pending,
    Streaming(TextStream),
    Done,
}

struct StreamContext {
    transport: Arc<dyn ChatTransport>,
    quota: Arc<dyn CallQuota>,
    provider: Arc<ProviderConfig>,
    slot: Arc<ProviderSlot>,
    chat: ChatRequest,
    cancel: Option<CancellationToken>,
    started: Instant,
    request_chars: usize,
    emitted_chars: usize,
}

impl StreamContext {
    async fn open(&self) -> HearthResult<TextStream> {
        let cancel = self.cancel.as_ref();
        if self.provider.capabilities.supports_streaming {
            bounded(
                &self.provider,
                cancel,
                self.transport.stream(&self.provider, &self.chat),
            )
            .await
        } else {
            tracing::debug!(provider = %self.provider.id, "Provider cannot stream, sending one full request");
            let text = bounded(
                &self.provider,
                cancel,
                self.transport.complete(&self.provider, &self.chat),
            )
            .await?;
            Ok(Box::pin(futures::stream::once(async move { Ok(text) })))
        }
    }

    /// Next chunk, bounded by the provider timeout as an idle limit
    async fn next_chunk(&self, inner: &mut TextStream) -> Option<HearthResult<String>> {
        let next = async {
            match tokio::time::timeout(self.provider.timeout(), inner.next()).await {
                Ok(item) => item,
                Err(_) => Some(Err(HearthError::timeout(
                    &self.provider.id,
                    self.provider.timeout_secs,
                ))),
            }
        };
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Some(Err(HearthError::Cancelled)),
                item = next => item,
            },
            None => next.await,
        }
    }

    fn fail(&self, error: &HearthError) {
        self.slot.health.record_failure();
        tracing::warn!(provider = %self.provider.id, error = %error, "Streaming call failed");
    }

    fn complete(&self) {
        let latency_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.slot.health.record_success(latency_ms);
        let tokens = u32::try_from((self.request_chars + self.emitted_chars) / 4).unwrap_or(u32::MAX);
        self.quota.record_call(&self.provider.id, tokens);
        tracing::info!(provider = %self.provider.id, latency_ms, "Streaming call completed");
    }
}

impl Router {
    /// Stream the response from a single provider
    ///
    /// There is no fallback: a partially streamed answer cannot be restarted
    /// elsewhere. Nothing is sent until the stream is first polled. A gap
    /// between chunks longer than the provider timeout ends the stream with a
    /// timeout error. Health is recorded once, when the stream fails or ends.
    #[instrument(skip(self, request), fields(forced = ?request.forced_provider))]
    pub async fn call_streaming(&self, request: &RouteRequest) -> HearthResult<TextStream> {
        self.admit()?;
        self.check_forced(request)?;

        let decision = self
            .select(request, &HashSet::new(), true)
            .ok_or_else(|| HearthError::exhausted(Vec::new()))?;
        let provider = decision.provider;
        let slot = self
            .slot(&provider.id)
            .ok_or_else(|| HearthError::exhausted(Vec::new()))?;

        let context = StreamContext {
            transport: self.transport.clone(),
            quota: self.quota.clone(),
            chat: request.to_chat_request(&provider),
            provider,
            slot,
            cancel: request.cancel.clone(),
            started: Instant::now(),
            request_chars: request.request_chars(),
            emitted_chars: 0,
        };

        let initial = (Phase::Pending, context);
        Ok(Box::pin(futures::stream::unfold(initial, |(mut phase, mut ctx)| async move {
            loop {
                match phase {
                    Phase::Done => return None,
                    Phase::Pending => {
                        ctx.started = Instant::now();
                        match ctx.open().await {
                            Ok(inner) => phase = Phase::Streaming(inner),
                            Err(error) => {
                                ctx.fail(&error);
                                return Some((Err(error), (Phase::Done, ctx)));
                            }
                        }
                    }
                    Phase::Streaming(mut inner) => match ctx.next_chunk(&mut inner).await {
                        Some(Ok(chunk)) => {
                            ctx.emitted_chars += chunk.chars().count();
                            return Some((Ok(chunk), (Phase::Streaming(inner), ctx)));
                        }
                        Some(Err(error)) => {
                            ctx.fail(&error);
                            return Some((Err(error), (Phase::Done, ctx)));
                        }
                        None => {
                            ctx.complete();
                            return None;
                        }
                    },
                }
            }
        })))
    }
}
