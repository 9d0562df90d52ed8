//! Provider configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::credential::mask_credential;

/// What a provider can do beyond plain chat completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderCapabilities {
    pub supports_streaming: bool,
    pub supports_vision: bool,
    pub supports_json_mode: bool,
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self {
            supports_streaming: true,
            supports_vision: false,
            supports_json_mode: false,
        }
    }
}

impl ProviderCapabilities {
    /// Plain boolean check against the request's needs
    pub fn satisfies(&self, needs_vision: bool, needs_json: bool) -> bool {
        (!needs_vision || self.supports_vision) && (!needs_json || self.supports_json_mode)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_priority() -> i32 {
    5
}

fn default_enabled() -> bool {
    true
}

fn default_max_context() -> u32 {
    8192
}

/// Configuration for one upstream OpenAI-compatible provider
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider id (also the circuit and quota key)
    pub id: String,
    /// Base URL; `/chat/completions` is appended
    pub base_url: String,
    /// Bearer credential, resolved from the environment at load time
    #[serde(default, alias = "api_key", skip_serializing)]
    pub credential: Option<String>,
    /// Name of an environment variable holding the credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    pub model_id: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens_default: u32,
    #[serde(default)]
    pub cost_per_1k_tokens: f64,
    /// Lower is preferred
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub capabilities: ProviderCapabilities,
    #[serde(default = "default_max_context")]
    pub max_context_tokens: u32,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("credential", &self.credential.as_deref().map(mask_credential))
            .field("api_key_env", &self.api_key_env)
            .field("model_id", &self.model_id)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens_default", &self.max_tokens_default)
            .field("cost_per_1k_tokens", &self.cost_per_1k_tokens)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("capabilities", &self.capabilities)
            .field("max_context_tokens", &self.max_context_tokens)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(
        id: impl Into<String>,
        base_url: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            credential: None,
            api_key_env: None,
            model_id: model_id.into(),
            timeout_secs: default_timeout_secs(),
            max_tokens_default: default_max_tokens(),
            cost_per_1k_tokens: 0.0,
            priority: default_priority(),
            enabled: true,
            capabilities: ProviderCapabilities::default(),
            max_context_tokens: default_max_context(),
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cost_per_1k_tokens(mut self, cost: f64) -> Self {
        self.cost_per_1k_tokens = cost;
        self
    }

    pub fn with_capabilities(mut self, capabilities: ProviderCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_max_context_tokens(mut self, max: u32) -> Self {
        self.max_context_tokens = max;
        self
    }

    pub fn with_max_tokens_default(mut self, max: u32) -> Self {
        self.max_tokens_default = max;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `{base_url}/chat/completions`, tolerating a trailing slash
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Provider id cannot be empty".to_string());
        }
        if self.base_url.trim().is_empty() {
            return Err(format!("Provider '{}' has an empty base_url", self.id));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "Provider '{}' base_url must start with http:// or https://",
                self.id
            ));
        }
        if self.model_id.trim().is_empty() {
            return Err(format!("Provider '{}' has an empty model_id", self.id));
        }
        if self.timeout_secs == 0 {
            return Err(format!("Provider '{}' timeout must be greater than 0", self.id));
        }
        if self.cost_per_1k_tokens < 0.0 {
            return Err(format!("Provider '{}' cost cannot be negative", self.id));
        }
        Ok(())
    }
}

/// Hot-patch applied to a registered provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderPatch {
    pub enabled: Option<bool>,
    pub model_id: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderPatch {
    pub fn enable() -> Self {
        Self {
            enabled: Some(true),
            ..Default::default()
        }
    }

    pub fn disable() -> Self {
        Self {
            enabled: Some(false),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Produce the replacement config; the original is left untouched
    pub fn apply(&self, current: &ProviderConfig) -> ProviderConfig {
        let mut next = current.clone();
        if let Some(enabled) = self.enabled {
            next.enabled = enabled;
        }
        if let Some(model_id) = &self.model_id {
            next.model_id = model_id.clone();
        }
        if let Some(base_url) = &self.base_url {
            next.base_url = base_url.clone();
        }
        next
    }
}
