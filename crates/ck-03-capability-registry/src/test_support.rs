//! Fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use ck_01_utility_bootstrap::{BootstrapConfig, UtilityBootstrap};
use ck_05_compliance_engine::{ComplianceConfig, ComplianceEngine};
use parking_lot::RwLock;
use shared_types::{
    CapabilityDefinition, Contract, LifecycleState, RestApiContract, ServiceSnapshot, TenantScope,
};

use crate::domain::RegistryConfig;
use crate::ports::ServiceDirectory;
use crate::service::CapabilityRegistry;

/// In-memory directory whose states tests flip directly.
#[derive(Default)]
pub(crate) struct StaticDirectory {
    services: RwLock<HashMap<String, ServiceSnapshot>>,
}

impl StaticDirectory {
    pub(crate) fn with_started(names: &[&str]) -> Self {
        let directory = Self::default();
        for name in names {
            directory.set_state(name, LifecycleState::Started);
        }
        directory
    }

    pub(crate) fn set_state(&self, name: &str, state: LifecycleState) {
        self.services.write().insert(
            name.to_string(),
            ServiceSnapshot {
                name: name.to_string(),
                state,
                state_changed_at: Utc::now(),
                dependencies: Vec::new(),
                tenant_scope: TenantScope::Global,
                last_health: None,
                last_error: None,
            },
        );
    }
}

impl ServiceDirectory for StaticDirectory {
    fn service_status(&self, name: &str) -> Option<ServiceSnapshot> {
        self.services.read().get(name).cloned()
    }

    fn services(&self) -> Vec<ServiceSnapshot> {
        self.services.read().values().cloned().collect()
    }
}

pub(crate) type TestRegistry = CapabilityRegistry<Arc<StaticDirectory>>;

pub(crate) fn registry() -> (TestRegistry, Arc<StaticDirectory>) {
    registry_with(RegistryConfig::default(), BootstrapConfig::default())
}

pub(crate) fn registry_with(
    config: RegistryConfig,
    bootstrap: BootstrapConfig,
) -> (TestRegistry, Arc<StaticDirectory>) {
    let utilities = UtilityBootstrap::new(bootstrap).bootstrap().unwrap();
    let compliance = ComplianceEngine::new(ComplianceConfig::default())
        .with_metrics(utilities.telemetry().metrics().clone());
    let directory = Arc::new(StaticDirectory::with_started(&["content_service"]));
    let registry = CapabilityRegistry::new(
        config,
        Arc::clone(&directory),
        Arc::new(utilities),
        Arc::new(compliance),
    );
    (registry, directory)
}

/// A valid `content` realm capability owned by `content_service`.
pub(crate) fn definition(name: &str, version: &str) -> CapabilityDefinition {
    CapabilityDefinition::new("content", name, "content_service", "FileParser")
        .with_version(version)
        .with_contract(Contract::RestApi(RestApiContract {
            endpoint: format!("/content/{name}"),
            method: "POST".to_string(),
            handler: name.to_string(),
        }))
}
