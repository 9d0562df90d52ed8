//! Process setup shared by every command

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use hearth_core::{
    ChatTransport, CircuitRegistry, CircuitTransport, HearthConfig, HttpTransport, Router,
};
use tracing_subscriber::EnvFilter;

/// Initialize logging with environment-based filtering
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
pub fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<HearthConfig> {
    let config = HearthConfig::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    if config.providers.is_empty() {
        tracing::warn!(path = %path.display(), "No providers configured");
    }
    Ok(config)
}

/// HTTP transport, behind per-provider circuit breakers when enabled
pub fn build_router(config: &HearthConfig) -> anyhow::Result<Router> {
    let http = HttpTransport::new().context("Failed to build HTTP client")?;
    let transport: Arc<dyn ChatTransport> = if config.circuit.enabled {
        let registry = Arc::new(CircuitRegistry::with_config(config.circuit.breaker_config()));
        tracing::debug!(
            failure_threshold = config.circuit.failure_threshold,
            "Circuit breakers enabled"
        );
        Arc::new(CircuitTransport::new(http, registry))
    } else {
        Arc::new(http)
    };
    Ok(Router::from_config(config, transport))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_router_from_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hearth.toml");
        fs::write(
            &path,
            r#"
[circuit]
enabled = true
failure_threshold = 2

[[providers]]
id = "ollama"
base_url = "http://localhost:11434/v1"
model_id = "llama3"
cost_per_1k_tokens = 0.0
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        let router = build_router(&config).unwrap();
        assert_eq!(router.provider_ids(), vec!["ollama"]);
    }

    #[test]
    fn test_missing_file_gives_empty_router() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        let router = build_router(&config).unwrap();
        assert!(router.is_empty());
    }
}
