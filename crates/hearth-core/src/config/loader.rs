//! Configuration loading: file, environment overrides, credentials, validation

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::credential::{resolve_credential, CredentialSource};
use super::settings::{HearthConfig, MAX_FALLBACKS_LIMIT};
use crate::error::{HearthError, HearthResult};

pub const ENV_MAX_FALLBACKS: &str = "HEARTH_MAX_FALLBACKS";
pub const ENV_RETEST_COOLDOWN_SECS: &str = "HEARTH_RETEST_COOLDOWN_SECS";
pub const ENV_CONFIG_PATH: &str = "HEARTH_CONFIG";

impl HearthConfig {
    /// Parse a TOML document without touching the environment
    pub fn from_toml_str(content: &str) -> HearthResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load and fully prepare a configuration using the process environment
    pub fn load(path: &Path) -> HearthResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load, apply overrides, resolve credentials and validate
    pub fn load_with_env<F>(path: &Path, lookup: F) -> HearthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = load_from_file(path)?;
        config.apply_env_overrides(&lookup)?;
        config.resolve_credentials(&lookup);
        config.validate()?;
        Ok(config)
    }

    /// Apply HEARTH_* routing overrides
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> HearthResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MAX_FALLBACKS) {
            self.routing.max_fallbacks = value.trim().parse().map_err(|_| {
                HearthError::config_with_context(
                    format!("Invalid {} value", ENV_MAX_FALLBACKS),
                    format!("Parsing max_fallbacks value '{}'", value),
                )
            })?;
        }

        if let Some(value) = lookup(ENV_RETEST_COOLDOWN_SECS) {
            self.routing.retest_cooldown_secs = value.trim().parse().map_err(|_| {
                HearthError::config_with_context(
                    format!("Invalid {} value", ENV_RETEST_COOLDOWN_SECS),
                    format!("Parsing retest cooldown value '{}'", value),
                )
            })?;
        }

        Ok(())
    }

    /// Replace each provider's credential with the resolved one
    pub fn resolve_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for provider in &mut self.providers {
            let info = resolve_credential(provider, &lookup);
            match info.source {
                CredentialSource::NotFound => {
                    tracing::debug!(provider = %provider.id, "No credential configured");
                }
                ref source => {
                    let masked = info.masked_key().unwrap_or_default();
                    tracing::debug!(
                        provider = %provider.id,
                        source = %source,
                        key = %masked,
                        "Resolved provider credential"
                    );
                }
            }
            provider.credential = info.key;
        }
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> HearthResult<()> {
        if self.routing.max_fallbacks > MAX_FALLBACKS_LIMIT {
            return Err(HearthError::config(format!(
                "max_fallbacks must be at most {}, got {}",
                MAX_FALLBACKS_LIMIT, self.routing.max_fallbacks
            )));
        }

        if self.circuit.enabled && self.circuit.failure_threshold == 0 {
            return Err(HearthError::config(
                "circuit failure_threshold must be greater than 0",
            ));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            provider.validate().map_err(HearthError::config)?;
            if !seen.insert(provider.id.as_str()) {
                return Err(HearthError::config(format!(
                    "Duplicate provider id '{}'",
                    provider.id
                )));
            }
        }

        Ok(())
    }
}

/// Load configuration from a TOML file
///
/// Returns the default (empty) config if the file doesn't exist.
pub fn load_from_file(path: &Path) -> HearthResult<HearthConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(HearthConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        HearthError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        HearthError::config_with_context(
            format!("Failed to parse TOML config: {}", e),
            format!("Deserializing TOML configuration from '{}'", path.display()),
        )
    })
}
