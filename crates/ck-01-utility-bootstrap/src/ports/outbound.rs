//! Driven Ports (SPI)

use shared_types::CallerContext;

/// Pluggable authorization decision.
///
/// Implementations must be cheap and non-blocking; they are called on the
/// capability registration path.
pub trait PolicyEngine: Send + Sync {
    /// Whether `ctx` may perform `action` on `resource`.
    fn is_allowed(&self, action: &str, resource: &str, ctx: &CallerContext) -> bool;
}
