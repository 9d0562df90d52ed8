//! Transport seam between the router and upstream providers

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::messages::ChatRequest;
use crate::config::ProviderConfig;
use crate::error::HearthResult;

/// Lazy, finite stream of response text chunks
pub type TextStream = Pin<Box<dyn Stream<Item = HearthResult<String>> + Send>>;

/// Sends one chat completion to one provider
///
/// Implementations perform a single attempt: retries, fallback and health
/// bookkeeping belong to the router.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Full response text
    async fn complete(&self, provider: &ProviderConfig, request: &ChatRequest)
        -> HearthResult<String>;

    /// Open a streamed response
    async fn stream(&self, provider: &ProviderConfig, request: &ChatRequest)
        -> HearthResult<TextStream>;
}
