//! # Caller Context
//!
//! Identity carried by every registry write. The kernel never derives identity
//! from payload fields; the context passed alongside the call is authoritative.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entities::TenantScope;

/// User id used for kernel-internal calls.
pub const SYSTEM_USER: &str = "system";

/// Identity and entitlements of a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub user_id: String,
    /// Tenant the caller acts for. `None` is the platform-wide view.
    pub tenant_id: Option<String>,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
    pub session_id: Option<String>,
    /// Never deserialized: system identity cannot arrive over the wire.
    #[serde(skip)]
    system: bool,
}

impl CallerContext {
    /// A platform-level user with no tenant.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: None,
            roles: BTreeSet::new(),
            permissions: BTreeSet::new(),
            session_id: None,
            system: false,
        }
    }

    /// The kernel itself. Always authorized.
    #[must_use]
    pub fn system() -> Self {
        Self {
            system: true,
            ..Self::user(SYSTEM_USER)
        }
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.system
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Scope that writes from this caller land in.
    #[must_use]
    pub fn scope(&self) -> TenantScope {
        match &self.tenant_id {
            Some(id) => TenantScope::Tenant(id.clone()),
            None => TenantScope::Global,
        }
    }
}
