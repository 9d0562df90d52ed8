//! Configuration for routing, breakers and providers

pub mod credential;
pub mod loader;
pub mod provider;
pub mod settings;

pub use credential::{mask_credential, resolve_credential, CredentialInfo, CredentialSource};
pub use loader::{load_from_file, ENV_CONFIG_PATH, ENV_MAX_FALLBACKS, ENV_RETEST_COOLDOWN_SECS};
pub use provider::{ProviderCapabilities, ProviderConfig, ProviderPatch};
pub use settings::{CircuitSettings, HearthConfig, RoutingSettings, MAX_FALLBACKS_LIMIT};
