//! Registry → container adapter.

use ck_02_lifecycle_container::LifecycleContainer;
use ck_03_capability_registry::ServiceDirectory;
use shared_types::ServiceSnapshot;

/// Answers the registry's owner lookups from the lifecycle container.
#[derive(Clone)]
pub struct ContainerDirectory {
    container: LifecycleContainer,
}

impl ContainerDirectory {
    pub fn new(container: LifecycleContainer) -> Self {
        Self { container }
    }
}

impl ServiceDirectory for ContainerDirectory {
    fn service_status(&self, name: &str) -> Option<ServiceSnapshot> {
        self.container.service_snapshot(name)
    }

    fn services(&self) -> Vec<ServiceSnapshot> {
        self.container.snapshot_all()
    }
}
