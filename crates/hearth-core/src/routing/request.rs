//! Routed request and routing decision

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::complexity::Complexity;
use crate::config::ProviderConfig;
use crate::llm::{ChatMessage, ChatRequest};

/// Token budget assumed for classification and context filtering when the
/// request leaves `max_tokens` unset
pub const CLASSIFICATION_TOKEN_BUDGET: u32 = 1000;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One request to route across providers
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f32,
    /// Falls back to the chosen provider's `max_tokens_default`
    pub max_tokens: Option<u32>,
    /// Honoured on the first attempt only, and only if registered and enabled
    pub forced_provider: Option<String>,
    pub needs_vision: bool,
    pub needs_json: bool,
    /// Falls back to the router default (2)
    pub max_fallbacks: Option<u32>,
    pub cancel: Option<CancellationToken>,
}

impl RouteRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            forced_provider: None,
            needs_vision: false,
            needs_json: false,
            max_fallbacks: None,
            cancel: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_forced_provider(mut self, provider: impl Into<String>) -> Self {
        self.forced_provider = Some(provider.into());
        self
    }

    pub fn with_vision(mut self, needs_vision: bool) -> Self {
        self.needs_vision = needs_vision;
        self
    }

    pub fn with_json(mut self, needs_json: bool) -> Self {
        self.needs_json = needs_json;
        self
    }

    pub fn with_max_fallbacks(mut self, max_fallbacks: u32) -> Self {
        self.max_fallbacks = Some(max_fallbacks);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Budget used for classification and the context-window filter
    pub fn token_budget(&self) -> u32 {
        self.max_tokens.unwrap_or(CLASSIFICATION_TOKEN_BUDGET)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Concrete chat request for one provider
    pub fn to_chat_request(&self, provider: &ProviderConfig) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(self.prompt.clone()));

        ChatRequest::new(
            messages,
            self.temperature,
            self.max_tokens.unwrap_or(provider.max_tokens_default),
        )
        .with_json_mode(self.needs_json && provider.capabilities.supports_json_mode)
    }

    /// Rough token count reported to the quota: characters / 4
    pub fn estimate_tokens(&self, response: &str) -> u32 {
        let chars = self.request_chars() + response.chars().count();
        u32::try_from(chars / 4).unwrap_or(u32::MAX)
    }

    /// Prompt plus system prompt length in characters
    pub fn request_chars(&self) -> usize {
        self.prompt.chars().count()
            + self.system_prompt.as_deref().map_or(0, |s| s.chars().count())
    }
}

/// Provider chosen for a request, with the detected complexity
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub provider: Arc<ProviderConfig>,
    pub complexity: Complexity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderCapabilities;
    use crate::llm::MessageRole;

    #[test]
    fn test_defaults() {
        let request = RouteRequest::new("Bonjour");
        assert_eq!(request.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(request.token_budget(), CLASSIFICATION_TOKEN_BUDGET);
        assert!(!request.is_cancelled());
    }

    #[test]
    fn test_chat_request_uses_provider_default_tokens() {
        let provider = ProviderConfig::new("a", "https://x", "m").with_max_tokens_default(512);
        let chat = RouteRequest::new("Bonjour")
            .with_system_prompt("Assistant familial")
            .to_chat_request(&provider);

        assert_eq!(chat.max_tokens, 512);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, MessageRole::System);
        assert_eq!(chat.messages[1].content, "Bonjour");

        let chat = RouteRequest::new("x").with_max_tokens(64).to_chat_request(&provider);
        assert_eq!(chat.max_tokens, 64);
    }

    #[test]
    fn test_json_mode_needs_provider_support() {
        let plain = ProviderConfig::new("a", "https://x", "m");
        let json = ProviderConfig::new("b", "https://x", "m").with_capabilities(ProviderCapabilities {
            supports_json_mode: true,
            ..Default::default()
        });
        let request = RouteRequest::new("x").with_json(true);

        assert!(!request.to_chat_request(&plain).json_mode);
        assert!(request.to_chat_request(&json).json_mode);
    }

    #[test]
    fn test_estimate_tokens() {
        let request = RouteRequest::new("12345678").with_system_prompt("abcd");
        assert_eq!(request.estimate_tokens("wxyz"), 4);
    }

    #[test]
    fn test_cancellation_flag() {
        let token = CancellationToken::new();
        let request = RouteRequest::new("x").with_cancellation(token.clone());
        token.cancel();
        assert!(request.is_cancelled());
    }
}
