//! Circuit breaker decorator for any [`ChatTransport`]

use std::sync::Arc;

use async_trait::async_trait;

use super::messages::ChatRequest;
use super::transport::{ChatTransport, TextStream};
use crate::config::ProviderConfig;
use crate::error::{HearthError, HearthResult};
use crate::recovery::{CircuitBreakerConfig, CircuitRegistry};

/// Wraps a transport in one breaker per provider id
///
/// An open breaker surfaces as [`HearthError::DependencyUnavailable`], which
/// the router's fallback loop treats like any other failed attempt. For
/// streams only opening the stream is protected.
pub struct CircuitTransport<T> {
    inner: T,
    registry: Arc<CircuitRegistry>,
    config: CircuitBreakerConfig,
}

impl<T: ChatTransport> CircuitTransport<T> {
    pub fn new(inner: T, registry: Arc<CircuitRegistry>) -> Self {
        let config = registry.default_config().clone();
        Self {
            inner,
            registry,
            config,
        }
    }

    pub fn with_config(mut self, config: CircuitBreakerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Arc<CircuitRegistry> {
        &self.registry
    }
}

#[async_trait]
impl<T: ChatTransport> ChatTransport for CircuitTransport<T> {
    async fn complete(
        &self,
        provider: &ProviderConfig,
        request: &ChatRequest,
    ) -> HearthResult<String> {
        let breaker = self
            .registry
            .get_with_config(&provider.id, self.config.clone());
        breaker
            .call(|| self.inner.complete(provider, request))
            .await
            .map_err(HearthError::from)
    }

    async fn stream(
        &self,
        provider: &ProviderConfig,
        request: &ChatRequest,
    ) -> HearthResult<TextStream> {
        let breaker = self
            .registry
            .get_with_config(&provider.id, self.config.clone());
        breaker
            .call(|| self.inner.stream(provider, request))
            .await
            .map_err(HearthError::from)
    }
}
