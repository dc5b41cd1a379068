//! Inbound port: the container's public API.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{HealthReport, KernelError, ServiceSnapshot, StartReport, TenantScope};

use crate::ports::ServiceInstance;

#[async_trait]
pub trait LifecycleApi: Send + Sync {
    /// Insert a service in `Registered`.
    fn register_service(
        &self,
        name: &str,
        instance: Arc<dyn ServiceInstance>,
        dependencies: Vec<String>,
        tenant_scope: TenantScope,
    ) -> Result<(), KernelError>;

    /// Start one service once its dependencies are running.
    async fn start(&self, name: &str) -> Result<(), KernelError>;

    /// Start every registered service in dependency order.
    async fn start_all(&self) -> Result<StartReport, KernelError>;

    /// Stop one service.
    async fn stop(&self, name: &str) -> Result<(), KernelError>;

    /// Stop everything in reverse dependency order. Returns the stopped names.
    async fn stop_all(&self) -> Vec<String>;

    /// Remove a service that is not initializing.
    fn deregister(&self, name: &str) -> Result<ServiceSnapshot, KernelError>;

    /// Aggregated health of the whole graph.
    fn get_health(&self) -> HealthReport;
}
