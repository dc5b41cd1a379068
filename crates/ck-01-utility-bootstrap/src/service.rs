//! Bootstrap sequence and the ready set of utilities.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::domain::{BootstrapConfig, BootstrapError, UtilityKind};
use crate::ports::PolicyEngine;
use crate::utilities::{
    ErrorAuditor, HealthAggregator, LoggerFactory, RealmPermissionPolicy, SecurityAuthorizer,
    TelemetrySink, TenantValidator,
};

/// Builder for [`Utilities`]. Consumed by [`UtilityBootstrap::bootstrap`].
pub struct UtilityBootstrap {
    config: BootstrapConfig,
    policy_engine: Option<Arc<dyn PolicyEngine>>,
    telemetry: Option<TelemetrySink>,
}

impl UtilityBootstrap {
    #[must_use]
    pub fn new(config: BootstrapConfig) -> Self {
        Self {
            config,
            policy_engine: None,
            telemetry: None,
        }
    }

    /// Install a custom authorization engine instead of the default policy.
    #[must_use]
    pub fn with_policy_engine(mut self, engine: Arc<dyn PolicyEngine>) -> Self {
        self.policy_engine = Some(engine);
        self
    }

    /// Reuse an existing metrics sink instead of creating a fresh registry.
    #[must_use]
    pub fn with_telemetry(mut self, sink: TelemetrySink) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Construct every utility in [`UtilityKind::CONSTRUCTION_ORDER`].
    ///
    /// The first failure aborts; nothing is returned half-built.
    pub fn bootstrap(self) -> Result<Utilities, BootstrapError> {
        let Self {
            config,
            policy_engine,
            telemetry,
        } = self;

        let result = construct(&config, policy_engine, telemetry);

        if let Err(e) = &result {
            error!(error = %e, "[Bootstrap] Aborting startup");
        }
        result
    }
}

fn construct(
    config: &BootstrapConfig,
    policy_engine: Option<Arc<dyn PolicyEngine>>,
    telemetry: Option<TelemetrySink>,
) -> Result<Utilities, BootstrapError> {
    let logger = LoggerFactory::new(&config.log_level)
        .map_err(|e| BootstrapError::construction(UtilityKind::Logger, e.to_string()))?;
    info!(directive = %logger.directive(), "[Bootstrap] Constructed logger");

    let telemetry = match telemetry {
        Some(sink) => sink,
        None => TelemetrySink::new()
            .map_err(|e| BootstrapError::construction(UtilityKind::Telemetry, e.to_string()))?,
    };
    info!("[Bootstrap] Constructed telemetry");

    let security = build_security(config, policy_engine)?;
    info!(enforcing = security.is_enforcing(), "[Bootstrap] Constructed security");

    let tenant = TenantValidator::new(config.known_tenants.iter().cloned());
    info!(known = config.known_tenants.len(), "[Bootstrap] Constructed tenant");

    let error_handler = ErrorAuditor::new(config.error_audit_capacity).ok_or_else(|| {
        BootstrapError::construction(
            UtilityKind::ErrorHandler,
            "error audit capacity must be at least 1",
        )
    })?;
    info!(capacity = error_handler.capacity(), "[Bootstrap] Constructed error_handler");

    let health = HealthAggregator::new();
    info!("[Bootstrap] Constructed health");

    Ok(Utilities {
        logger,
        telemetry,
        security,
        tenant,
        error_handler,
        health,
        ready_at: Utc::now(),
    })
}

fn build_security(
    config: &BootstrapConfig,
    policy_engine: Option<Arc<dyn PolicyEngine>>,
) -> Result<SecurityAuthorizer, BootstrapError> {
    if let Some(engine) = policy_engine {
        return Ok(SecurityAuthorizer::with_engine(engine));
    }
    if !config.enforce_authorization {
        return Ok(SecurityAuthorizer::open());
    }
    if config.admin_role.trim().is_empty() {
        return Err(BootstrapError::construction(
            UtilityKind::Security,
            "authorization is enforced but no admin role is configured",
        ));
    }
    Ok(SecurityAuthorizer::with_engine(Arc::new(
        RealmPermissionPolicy::new(config.admin_role.clone()),
    )))
}

/// Borrowed handle to one utility, tagged by kind.
#[derive(Clone, Copy)]
pub enum Utility<'a> {
    Logger(&'a LoggerFactory),
    Telemetry(&'a TelemetrySink),
    Security(&'a SecurityAuthorizer),
    Tenant(&'a TenantValidator),
    ErrorHandler(&'a ErrorAuditor),
    Health(&'a HealthAggregator),
}

impl std::fmt::Debug for Utility<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Utility({})", self.kind())
    }
}

impl Utility<'_> {
    #[must_use]
    pub fn kind(&self) -> UtilityKind {
        match self {
            Self::Logger(_) => UtilityKind::Logger,
            Self::Telemetry(_) => UtilityKind::Telemetry,
            Self::Security(_) => UtilityKind::Security,
            Self::Tenant(_) => UtilityKind::Tenant,
            Self::ErrorHandler(_) => UtilityKind::ErrorHandler,
            Self::Health(_) => UtilityKind::Health,
        }
    }
}

/// Every utility, fully constructed. Holding one proves bootstrap completed.
pub struct Utilities {
    logger: LoggerFactory,
    telemetry: TelemetrySink,
    security: SecurityAuthorizer,
    tenant: TenantValidator,
    error_handler: ErrorAuditor,
    health: HealthAggregator,
    ready_at: DateTime<Utc>,
}

impl std::fmt::Debug for Utilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Utilities")
            .field("ready_at", &self.ready_at)
            .field("security", &self.security)
            .finish_non_exhaustive()
    }
}

impl Utilities {
    /// Typed lookup by kind.
    #[must_use]
    pub fn get_utility(&self, kind: UtilityKind) -> Utility<'_> {
        match kind {
            UtilityKind::Logger => Utility::Logger(&self.logger),
            UtilityKind::Telemetry => Utility::Telemetry(&self.telemetry),
            UtilityKind::Security => Utility::Security(&self.security),
            UtilityKind::Tenant => Utility::Tenant(&self.tenant),
            UtilityKind::ErrorHandler => Utility::ErrorHandler(&self.error_handler),
            UtilityKind::Health => Utility::Health(&self.health),
        }
    }

    /// Lookup by name. Unknown names return `UtilityNotFound`.
    pub fn get_utility_by_name(&self, name: &str) -> Result<Utility<'_>, BootstrapError> {
        Ok(self.get_utility(name.parse()?))
    }

    #[must_use]
    pub fn logger(&self) -> &LoggerFactory {
        &self.logger
    }

    #[must_use]
    pub fn telemetry(&self) -> &TelemetrySink {
        &self.telemetry
    }

    #[must_use]
    pub fn security(&self) -> &SecurityAuthorizer {
        &self.security
    }

    #[must_use]
    pub fn tenant(&self) -> &TenantValidator {
        &self.tenant
    }

    #[must_use]
    pub fn error_handler(&self) -> &ErrorAuditor {
        &self.error_handler
    }

    #[must_use]
    pub fn health(&self) -> &HealthAggregator {
        &self.health
    }

    #[must_use]
    pub fn construction_order(&self) -> &'static [UtilityKind] {
        &UtilityKind::CONSTRUCTION_ORDER
    }

    #[must_use]
    pub fn ready_at(&self) -> DateTime<Utc> {
        self.ready_at
    }
}
