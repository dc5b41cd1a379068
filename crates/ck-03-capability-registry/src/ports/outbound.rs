//! Outbound port: read-only view of the lifecycle container.

use shared_types::ServiceSnapshot;

/// Where the registry looks up owning services.
///
/// Production: `ContainerDirectory` in `kernel-runtime`.
pub trait ServiceDirectory: Send + Sync {
    /// Current registration of `name`, if any.
    fn service_status(&self, name: &str) -> Option<ServiceSnapshot>;

    /// Every registration.
    fn services(&self) -> Vec<ServiceSnapshot>;
}

impl<T: ServiceDirectory + ?Sized> ServiceDirectory for std::sync::Arc<T> {
    fn service_status(&self, name: &str) -> Option<ServiceSnapshot> {
        (**self).service_status(name)
    }

    fn services(&self) -> Vec<ServiceSnapshot> {
        (**self).services()
    }
}
