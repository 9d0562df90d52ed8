//! Credential resolution for providers

use super::provider::ProviderConfig;

/// Where a provider credential was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// From HEARTH_<ID>_API_KEY
    HearthEnvVar,
    /// From the variable named by `api_key_env`
    NamedEnvVar,
    /// From the configuration file
    ConfigFile,
    /// No credential found
    NotFound,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::HearthEnvVar => write!(f, "HEARTH_*_API_KEY env"),
            CredentialSource::NamedEnvVar => write!(f, "env variable"),
            CredentialSource::ConfigFile => write!(f, "config file"),
            CredentialSource::NotFound => write!(f, "not found"),
        }
    }
}

/// Result of credential resolution with source information
#[derive(Debug, Clone)]
pub struct CredentialInfo {
    pub key: Option<String>,
    pub source: CredentialSource,
    pub env_var_name: Option<String>,
}

impl CredentialInfo {
    /// Get a display-safe version (masked) of the credential
    pub fn masked_key(&self) -> Option<String> {
        self.key.as_ref().map(|k| mask_credential(k))
    }
}

/// Environment variable name checked first for a provider id
pub fn hearth_env_var(provider_id: &str) -> String {
    let normalized: String = provider_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("HEARTH_{}_API_KEY", normalized)
}

/// Resolve a credential: HEARTH_<ID>_API_KEY, then `api_key_env`, then the file value
pub fn resolve_credential<F>(config: &ProviderConfig, lookup: F) -> CredentialInfo
where
    F: Fn(&str) -> Option<String>,
{
    let hearth_var = hearth_env_var(&config.id);
    if let Some(key) = lookup(&hearth_var).filter(|k| !k.is_empty()) {
        return CredentialInfo {
            key: Some(key),
            source: CredentialSource::HearthEnvVar,
            env_var_name: Some(hearth_var),
        };
    }

    if let Some(var) = &config.api_key_env {
        if let Some(key) = lookup(var).filter(|k| !k.is_empty()) {
            return CredentialInfo {
                key: Some(key),
                source: CredentialSource::NamedEnvVar,
                env_var_name: Some(var.clone()),
            };
        }
    }

    if let Some(key) = config.credential.as_ref().filter(|k| !k.is_empty()) {
        return CredentialInfo {
            key: Some(key.clone()),
            source: CredentialSource::ConfigFile,
            env_var_name: None,
        };
    }

    CredentialInfo {
        key: None,
        source: CredentialSource::NotFound,
        env_var_name: None,
    }
}

/// Mask a credential for safe display
pub fn mask_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let len = chars.len();
    if len <= 12 {
        return "*".repeat(len);
    }

    let prefix: String = chars[..8].iter().collect();
    let suffix: String = chars[len - 4..].iter().collect();
    let mask_len = len - 12;

    format!("{}{}...{}", prefix, "*".repeat(mask_len.min(8)), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_mask_credential() {
        assert_eq!(
            mask_credential("sk-ant-api03-abc123xyz789"),
            "sk-ant-a********...z789"
        );
        assert_eq!(mask_credential("short"), "*****");
    }

    #[test]
    fn test_hearth_env_var_normalizes_id() {
        assert_eq!(hearth_env_var("open-router"), "HEARTH_OPEN_ROUTER_API_KEY");
    }

    #[test]
    fn test_resolution_order() {
        let config = ProviderConfig::new("mistral", "https://api.mistral.ai/v1", "small")
            .with_credential("from-file");
        let mut config_with_env = config.clone();
        config_with_env.api_key_env = Some("MISTRAL_API_KEY".into());

        let info = resolve_credential(&config, env(&[]));
        assert_eq!(info.source, CredentialSource::ConfigFile);

        let info = resolve_credential(&config_with_env, env(&[("MISTRAL_API_KEY", "named")]));
        assert_eq!(info.source, CredentialSource::NamedEnvVar);
        assert_eq!(info.key.as_deref(), Some("named"));

        let info = resolve_credential(
            &config_with_env,
            env(&[("MISTRAL_API_KEY", "named"), ("HEARTH_MISTRAL_API_KEY", "hearth")]),
        );
        assert_eq!(info.source, CredentialSource::HearthEnvVar);
        assert_eq!(info.key.as_deref(), Some("hearth"));
    }

    #[test]
    fn test_missing_credential() {
        let config = ProviderConfig::new("ollama", "http://localhost:11434/v1", "llama3");
        let info = resolve_credential(&config, env(&[("HEARTH_OLLAMA_API_KEY", "")]));
        assert_eq!(info.source, CredentialSource::NotFound);
        assert!(info.masked_key().is_none());
    }
}
