//! Provider selection, health and fallback

pub mod complexity;
pub mod health;
pub mod quota;
pub mod request;
pub mod router;

pub use complexity::{Complexity, ComplexityClassifier};
pub use health::{HealthSnapshot, ProviderHealthTracker};
pub use quota::{CallQuota, UnlimitedQuota};
pub use request::{RouteRequest, RoutingDecision};
pub use router::{ProviderStatus, RouteRank, Router, DEFAULT_MAX_FALLBACKS};
