//! HTTP transport for OpenAI-compatible chat completion endpoints

use std::collections::VecDeque;
use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde_json::Value;

use super::messages::ChatRequest;
use super::sse_decoder::{SseDecoder, SseEvent};
use super::transport::{ChatTransport, TextStream};
use crate::config::ProviderConfig;
use crate::error::{HearthError, HearthResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `reqwest` based [`ChatTransport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> HearthResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HearthError::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn request(
        &self,
        provider: &ProviderConfig,
        request: &ChatRequest,
        stream: bool,
    ) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(provider.completions_url())
            .json(&request.to_body(&provider.model_id, stream));
        match &provider.credential {
            Some(credential) => builder.bearer_auth(credential),
            None => builder,
        }
    }

    async fn send(
        &self,
        provider: &ProviderConfig,
        builder: reqwest::RequestBuilder,
    ) -> HearthResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(provider = %provider.id, status = status.as_u16(), "Upstream rejected request");
            return Err(HearthError::upstream_status(
                &provider.id,
                status.as_u16(),
                format!("HTTP {}: {}", status.as_u16(), body.trim()),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn complete(
        &self,
        provider: &ProviderConfig,
        request: &ChatRequest,
    ) -> HearthResult<String> {
        let builder = self
            .request(provider, request, false)
            .timeout(provider.timeout());
        let response = self.send(provider, builder).await?;

        let value: Value = response
            .json()
            .await
            .map_err(|e| transport_error(provider, e))?;
        extract_message_content(&value).ok_or_else(|| {
            HearthError::upstream(&provider.id, "Response has no choices[0].message.content")
        })
    }

    async fn stream(
        &self,
        provider: &ProviderConfig,
        request: &ChatRequest,
    ) -> HearthResult<TextStream> {
        // No whole-request timeout: it would cut long streams short. The
        // router bounds the wait for each chunk instead.
        let builder = self.request(provider, request, true);
        let response = self.send(provider, builder).await?;
        Ok(sse_text_stream(provider.id.clone(), response.bytes_stream()))
    }
}

fn transport_error(provider: &ProviderConfig, error: reqwest::Error) -> HearthError {
    if error.is_timeout() {
        HearthError::timeout(&provider.id, provider.timeout_secs)
    } else {
        HearthError::Upstream {
            provider: provider.id.clone(),
            message: error.to_string(),
            status_code: error.status().map(|s| s.as_u16()),
        }
    }
}

/// `choices[0].message.content` of a non-streamed completion
pub fn extract_message_content(value: &Value) -> Option<String> {
    value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

struct SseState<S> {
    bytes: std::pin::Pin<Box<S>>,
    decoder: SseDecoder,
    ready: VecDeque<String>,
    finished: bool,
    provider: String,
}

impl<S> SseState<S> {
    fn absorb(&mut self, events: impl IntoIterator<Item = SseEvent>) {
        for event in events {
            if event.is_done() {
                self.finished = true;
                return;
            }
            if let Some(text) = event.delta_content().filter(|t| !t.is_empty()) {
                self.ready.push_back(text);
            }
        }
    }
}

/// Turn an SSE byte stream into text chunks, ending at `[DONE]` or end of body
pub fn sse_text_stream<S, B, E>(provider: String, bytes: S) -> TextStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = SseState {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
        finished: false,
        provider,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(text) = state.ready.pop_front() {
                return Some((Ok(text), state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.feed(chunk.as_ref());
                    state.absorb(events);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    let error =
                        HearthError::upstream(&state.provider, format!("Stream error: {}", e));
                    return Some((Err(error), state));
                }
                None => {
                    let tail = state.decoder.finish();
                    state.absorb(tail);
                    state.finished = true;
                }
            }
        }
    }))
}
