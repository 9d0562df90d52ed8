//! Call quota seam
//!
//! The token-bucket limiter lives outside this crate; the router only asks
//! whether a call may proceed and reports what it spent.

/// Rate limiter consulted before every routed call
#[cfg_attr(test, mockall::automock)]
pub trait CallQuota: Send + Sync {
    fn can_call(&self) -> bool;

    /// Report one completed call against `service` (the provider id)
    fn record_call(&self, service: &str, tokens: u32);
}

/// Quota that never refuses
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedQuota;

impl CallQuota for UnlimitedQuota {
    fn can_call(&self) -> bool {
        true
    }

    fn record_call(&self, service: &str, tokens: u32) {
        tracing::trace!(service, tokens, "Call recorded");
    }
}
