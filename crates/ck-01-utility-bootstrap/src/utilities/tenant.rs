//! Tenant validator.
//!
//! Fails closed: a tenant-carrying caller must belong to a known, active
//! tenant, and may only touch global scope or its own tenant's scope.

use std::collections::HashSet;

use parking_lot::RwLock;
use shared_types::{CallerContext, KernelError, TenantScope};
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct TenantValidator {
    known: RwLock<HashSet<String>>,
    suspended: RwLock<HashSet<String>>,
}

impl TenantValidator {
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: RwLock::new(known.into_iter().map(Into::into).collect()),
            suspended: RwLock::new(HashSet::new()),
        }
    }

    pub fn register_tenant(&self, tenant_id: impl Into<String>) {
        let tenant_id = tenant_id.into();
        info!(tenant = %tenant_id, "[Tenant] Registered");
        self.known.write().insert(tenant_id);
    }

    pub fn suspend_tenant(&self, tenant_id: &str) {
        warn!(tenant = %tenant_id, "[Tenant] Suspended");
        self.suspended.write().insert(tenant_id.to_string());
    }

    pub fn reinstate_tenant(&self, tenant_id: &str) {
        self.suspended.write().remove(tenant_id);
    }

    #[must_use]
    pub fn is_active(&self, tenant_id: &str) -> bool {
        self.known.read().contains(tenant_id) && !self.suspended.read().contains(tenant_id)
    }

    /// Check that `ctx` may act on `scope`.
    ///
    /// Platform callers (no tenant) and the kernel itself may act on any scope.
    pub fn validate_tenant_access(
        &self,
        ctx: &CallerContext,
        scope: &TenantScope,
    ) -> Result<(), KernelError> {
        if ctx.is_system() {
            return Ok(());
        }

        let Some(tenant) = ctx.tenant_id.as_deref() else {
            return Ok(());
        };

        let deny = |reason: String| {
            warn!(user_id = %ctx.user_id, tenant = %tenant, %reason, "[Tenant] Access denied");
            Err(KernelError::TenantAccessDenied {
                user_id: ctx.user_id.clone(),
                tenant: Some(tenant.to_string()),
                reason,
            })
        };

        if !self.known.read().contains(tenant) {
            return deny("unknown tenant".to_string());
        }
        if self.suspended.read().contains(tenant) {
            return deny("tenant suspended".to_string());
        }

        match scope {
            TenantScope::Global => Ok(()),
            TenantScope::Tenant(owner) if owner == tenant => Ok(()),
            TenantScope::Tenant(owner) => deny(format!("scope belongs to tenant '{owner}'")),
        }
    }
}
