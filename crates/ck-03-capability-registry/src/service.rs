//! Capability Registry service.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ck_01_utility_bootstrap::Utilities;
use ck_04_route_index::{RouteEntry, RouteIndex, RouteQuery};
use ck_05_compliance_engine::{ComplianceApi, ComplianceEngine, CorpusSource};
use parking_lot::RwLock;
use shared_bus::{EventPublisher, KernelEvent};
use shared_types::{
    CallerContext, CapabilityDefinition, CapabilityKey, ComplianceFinding, FindingSink,
    KernelError, RegisteredCapability, RuleId, ServiceSnapshot, TenantScope,
};
use tracing::{debug, info, warn};

use crate::domain::{decide, RegistrationOutcome, RegistryConfig, VersionDecision};
use crate::ports::{RegistryApi, ServiceDirectory};

/// Capability table plus the route index derived from it.
///
/// Lock order: capability table, then route index. The index is updated
/// before the table lock is released, so a returned registration is visible
/// to every later discovery.
pub struct CapabilityRegistry<D: ServiceDirectory> {
    config: RegistryConfig,
    capabilities: RwLock<HashMap<CapabilityKey, RegisteredCapability>>,
    routes: RouteIndex,
    directory: D,
    utilities: Arc<Utilities>,
    compliance: Arc<ComplianceEngine>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl<D: ServiceDirectory> CapabilityRegistry<D> {
    pub fn new(
        config: RegistryConfig,
        directory: D,
        utilities: Arc<Utilities>,
        compliance: Arc<ComplianceEngine>,
    ) -> Self {
        Self {
            config,
            capabilities: RwLock::new(HashMap::new()),
            routes: RouteIndex::new(),
            directory,
            utilities,
            compliance,
            publisher: None,
        }
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    #[must_use]
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Stored capability under `key`, whatever its owner's state.
    #[must_use]
    pub fn get_capability(&self, key: &CapabilityKey) -> Option<RegisteredCapability> {
        self.capabilities.read().get(key).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.capabilities.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct domains currently indexed.
    #[must_use]
    pub fn domains(&self) -> Vec<String> {
        self.routes.domains()
    }

    /// [`RegistryApi::purge_inactive`] with the configured grace.
    pub fn purge_expired(&self) -> Vec<CapabilityKey> {
        self.purge_inactive(self.config.orphan_grace)
    }

    fn effective_scope(definition: &CapabilityDefinition, caller: &CallerContext) -> TenantScope {
        if caller.is_system() || caller.tenant_id.is_none() {
            definition.tenant_scope.clone()
        } else {
            caller.scope()
        }
    }

    fn check_owner(&self, service_name: &str) -> Result<(), KernelError> {
        match self.directory.service_status(service_name) {
            None => Err(KernelError::ServiceNotFound {
                name: service_name.to_string(),
            }),
            Some(snapshot) if !snapshot.state.accepts_capabilities() => {
                Err(KernelError::ServiceNotActive {
                    name: service_name.to_string(),
                    state: Some(snapshot.state),
                })
            }
            Some(_) => Ok(()),
        }
    }

    /// Everything that must hold before the table is touched.
    fn admit(
        &self,
        definition: &CapabilityDefinition,
        caller: &CallerContext,
        scope: &TenantScope,
    ) -> Result<(), KernelError> {
        self.utilities
            .security()
            .authorize_capability_write(caller, &definition.realm)?;
        self.utilities
            .tenant()
            .validate_tenant_access(caller, scope)?;

        let blocking: Vec<ComplianceFinding> = self
            .compliance
            .validate_definition(definition, caller)
            .into_iter()
            .filter(ComplianceFinding::is_blocking)
            .collect();
        if !blocking.is_empty() {
            return Err(KernelError::StructuralValidationFailed {
                target: definition.key().to_string(),
                findings: blocking,
            });
        }

        self.check_owner(&definition.service_name)
    }

    /// Write under the table lock. Returns the outcome and whether the
    /// content changed without a version bump.
    fn store(
        &self,
        record: RegisteredCapability,
        caller: &CallerContext,
    ) -> Result<(RegistrationOutcome, bool), KernelError> {
        let key = record.key();
        let mut table = self.capabilities.write();
        let existing = table.get(&key);

        if let (Some(existing), Some(tenant)) = (existing, caller.tenant_id.as_deref()) {
            if !caller.is_system() && existing.tenant_scope != record.tenant_scope {
                return Err(KernelError::TenantAccessDenied {
                    user_id: caller.user_id.clone(),
                    tenant: Some(tenant.to_string()),
                    reason: format!(
                        "capability '{key}' is owned by scope {}",
                        existing.tenant_scope
                    ),
                });
            }
        }

        let (outcome, unbumped) = match decide(existing, &record, self.config.downgrade_policy)? {
            VersionDecision::Ignore { current } => {
                return Ok((RegistrationOutcome::Ignored { current }, false));
            }
            VersionDecision::Insert => (RegistrationOutcome::Inserted, false),
            VersionDecision::Replace {
                previous,
                unbumped_change,
            } => (RegistrationOutcome::Superseded { previous }, unbumped_change),
        };

        self.routes.upsert(RouteEntry::from_registered(&record));
        table.insert(key, record);
        Ok((outcome, unbumped))
    }

    fn count(&self, outcome: &str) {
        self.utilities
            .telemetry()
            .metrics()
            .capability_registrations
            .with_label_values(&[outcome])
            .inc();
    }

    fn publish(&self, event: KernelEvent) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(event);
        }
    }

    fn is_discoverable(&self, service_name: &str, cache: &mut HashMap<String, bool>) -> bool {
        if let Some(known) = cache.get(service_name) {
            return *known;
        }
        let visible = self
            .directory
            .service_status(service_name)
            .is_some_and(|s| s.state.is_discoverable());
        cache.insert(service_name.to_string(), visible);
        visible
    }
}

impl<D: ServiceDirectory> RegistryApi for CapabilityRegistry<D> {
    fn register_domain_capability(
        &self,
        mut definition: CapabilityDefinition,
        caller: &CallerContext,
    ) -> Result<RegistrationOutcome, KernelError> {
        let key = definition.key();
        let scope = Self::effective_scope(&definition, caller);

        if let Err(e) = self.admit(&definition, caller, &scope) {
            debug!(capability = %key, user_id = %caller.user_id, error = %e, "[Registry] Registration refused");
            self.count("rejected");
            return Err(e);
        }

        definition.tenant_scope = scope.clone();
        let record = RegisteredCapability {
            fingerprint: definition.fingerprint(),
            definition,
            tenant_scope: scope,
            registered_at: Utc::now(),
            registered_by: caller.user_id.clone(),
        };
        let service_name = record.definition.service_name.clone();
        let version = record.definition.version.clone();
        let accepted = record.definition.clone();

        let (outcome, unbumped) = match self.store(record, caller) {
            Ok(result) => result,
            Err(e) => {
                warn!(capability = %key, error = %e, "[Registry] Registration refused");
                self.count("rejected");
                return Err(e);
            }
        };
        self.count(outcome.as_str());

        match &outcome {
            RegistrationOutcome::Ignored { current } => {
                info!(capability = %key, current = %current, offered = %version, "[Registry] Ignored downgrade");
                return Ok(outcome);
            }
            RegistrationOutcome::Inserted => {
                info!(capability = %key, service = %service_name, version = %version, "[Registry] Capability registered");
            }
            RegistrationOutcome::Superseded { previous } => {
                info!(capability = %key, service = %service_name, previous = %previous, version = %version, "[Registry] Capability superseded");
            }
        }

        self.compliance.record_accepted(&accepted);
        if unbumped {
            self.compliance.raise(ComplianceFinding::warning(
                RuleId::UnbumpedVersion,
                key.to_string(),
                format!("definition changed but version stayed at {version}"),
            ));
        }

        let previous_version = match &outcome {
            RegistrationOutcome::Superseded { previous } => Some(previous.clone()),
            _ => None,
        };
        self.publish(KernelEvent::CapabilityRegistered {
            key,
            service_name,
            version,
            previous_version,
        });
        Ok(outcome)
    }

    fn discover_routes(&self, query: &RouteQuery) -> Vec<RouteEntry> {
        self.utilities.telemetry().metrics().route_queries.inc();

        let mut owners = HashMap::new();
        let routes: Vec<RouteEntry> = self
            .routes
            .query(query)
            .into_iter()
            .filter(|route| self.is_discoverable(&route.service_name, &mut owners))
            .collect();

        debug!(query = ?query, matches = routes.len(), "[Registry] Route discovery");
        routes
    }

    fn discover_by_capability_name(
        &self,
        realm: &str,
        capability_name: &str,
    ) -> Option<CapabilityDefinition> {
        let definition = self
            .capabilities
            .read()
            .get(&CapabilityKey::new(realm, capability_name))
            .map(|c| c.definition.clone())?;

        self.directory
            .service_status(&definition.service_name)
            .is_some_and(|s| s.state.is_discoverable())
            .then_some(definition)
    }

    fn list_capabilities(&self) -> Vec<RegisteredCapability> {
        let mut all: Vec<RegisteredCapability> =
            self.capabilities.read().values().cloned().collect();
        all.sort_by_key(RegisteredCapability::key);
        all
    }

    fn unregister_capability(
        &self,
        realm: &str,
        capability_name: &str,
        caller: &CallerContext,
    ) -> Result<RegisteredCapability, KernelError> {
        let key = CapabilityKey::new(realm, capability_name);
        self.utilities
            .security()
            .authorize_capability_write(caller, realm)
            .inspect_err(|e| {
                debug!(capability = %key, user_id = %caller.user_id, error = %e, "[Registry] Unregistration refused");
            })?;

        let removed = {
            let mut table = self.capabilities.write();
            let existing = table
                .get(&key)
                .ok_or_else(|| KernelError::CapabilityNotFound {
                    key: key.to_string(),
                })?;
            if !caller.is_system() {
                self.utilities
                    .tenant()
                    .validate_tenant_access(caller, &existing.tenant_scope)?;
                if caller.tenant_id.is_some() && existing.tenant_scope != caller.scope() {
                    return Err(KernelError::TenantAccessDenied {
                        user_id: caller.user_id.clone(),
                        tenant: caller.tenant_id.clone(),
                        reason: format!(
                            "capability '{key}' is owned by scope {}",
                            existing.tenant_scope
                        ),
                    });
                }
            }
            self.routes.remove(&key);
            table.remove(&key).ok_or_else(|| KernelError::CapabilityNotFound {
                key: key.to_string(),
            })?
        };

        self.compliance.forget(std::slice::from_ref(&key));
        info!(
            capability = %key,
            service = %removed.definition.service_name,
            user_id = %caller.user_id,
            "[Registry] Capability unregistered"
        );
        self.publish(KernelEvent::CapabilityRemoved {
            key,
            service_name: removed.definition.service_name.clone(),
        });
        Ok(removed)
    }

    fn remove_service_capabilities(&self, service_name: &str) -> Vec<CapabilityKey> {
        let mut removed: Vec<CapabilityKey> = {
            let mut table = self.capabilities.write();
            let keys: Vec<CapabilityKey> = table
                .iter()
                .filter(|(_, c)| c.definition.service_name == service_name)
                .map(|(key, _)| key.clone())
                .collect();
            for key in &keys {
                table.remove(key);
            }
            self.routes.remove_service(service_name);
            keys
        };

        removed.sort();
        self.compliance.forget(&removed);
        if !removed.is_empty() {
            info!(service = service_name, removed = removed.len(), "[Registry] Removed service capabilities");
        }
        for key in &removed {
            self.publish(KernelEvent::CapabilityRemoved {
                key: key.clone(),
                service_name: service_name.to_string(),
            });
        }
        removed
    }

    fn purge_inactive(&self, grace: Duration) -> Vec<CapabilityKey> {
        let owners: BTreeSet<String> = self
            .capabilities
            .read()
            .values()
            .map(|c| c.definition.service_name.clone())
            .collect();

        let now = Utc::now();
        let grace = chrono::Duration::from_std(grace).ok();
        let expired = owners.into_iter().filter(|owner| match self.directory.service_status(owner) {
            None => true,
            Some(snapshot) => {
                snapshot.state.is_terminal()
                    && grace.is_some_and(|g| now - snapshot.state_changed_at >= g)
            }
        });

        let mut purged = Vec::new();
        for owner in expired.collect::<Vec<_>>() {
            warn!(service = %owner, "[Registry] Purging capabilities of inactive service");
            purged.extend(self.remove_service_capabilities(&owner));
        }
        purged.sort();
        purged
    }
}

/// Corpus view for compliance scans: the capability table plus every service.
impl<D: ServiceDirectory> CorpusSource for CapabilityRegistry<D> {
    fn capabilities(&self) -> Vec<RegisteredCapability> {
        self.list_capabilities()
    }

    fn services(&self) -> Vec<ServiceSnapshot> {
        self.directory.services()
    }
}
