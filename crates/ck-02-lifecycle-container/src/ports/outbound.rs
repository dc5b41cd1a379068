//! Outbound ports: hooks the container drives on each managed service.

use async_trait::async_trait;
use shared_types::HealthStatus;

use crate::domain::ServiceError;

/// A business service managed by the container.
///
/// Hooks run on a spawned task, so a caller giving up on `start` never
/// cancels `initialize`.
#[async_trait]
pub trait ServiceInstance: Send + Sync + 'static {
    /// Acquire resources. Dependencies are running when this is called.
    async fn initialize(&self) -> Result<(), ServiceError>;

    /// Release resources. Failures are audited; the service still ends Stopped.
    async fn shutdown(&self) -> Result<(), ServiceError>;

    /// Check used by the health watcher.
    async fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}
