//! Security authorizer with a pluggable policy engine.
//!
//! Resolution order:
//! 1. The kernel's own identity ([`CallerContext::system`]) is always allowed.
//! 2. With no engine installed, access is open.
//! 3. Otherwise the engine decides.

use std::sync::Arc;

use shared_types::{CallerContext, KernelError};
use tracing::warn;

use crate::ports::PolicyEngine;

/// Action name for registry writes.
pub const ACTION_WRITE: &str = "write";

/// Resource prefix for capability registry checks.
pub const CAPABILITY_RESOURCE_PREFIX: &str = "capability_registry";

/// Resource string for the capability registry partition of `realm`.
#[must_use]
pub fn capability_resource(realm: &str) -> String {
    format!("{CAPABILITY_RESOURCE_PREFIX}/{realm}")
}

/// Default engine: realm-scoped write permissions.
///
/// A caller may write capabilities into realm `r` when it holds permission
/// `capability:write`, permission `capability:write:r`, or the admin role.
/// Any other resource requires permission `<resource>:<action>` or the admin role.
#[derive(Debug, Clone)]
pub struct RealmPermissionPolicy {
    admin_role: String,
}

impl RealmPermissionPolicy {
    pub fn new(admin_role: impl Into<String>) -> Self {
        Self {
            admin_role: admin_role.into(),
        }
    }
}

impl PolicyEngine for RealmPermissionPolicy {
    fn is_allowed(&self, action: &str, resource: &str, ctx: &CallerContext) -> bool {
        if ctx.has_role(&self.admin_role) {
            return true;
        }

        match resource
            .strip_prefix(CAPABILITY_RESOURCE_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(realm) => {
                ctx.has_permission(&format!("capability:{action}"))
                    || ctx.has_permission(&format!("capability:{action}:{realm}"))
            }
            None => ctx.has_permission(&format!("{resource}:{action}")),
        }
    }
}

/// Mandatory security utility.
#[derive(Clone)]
pub struct SecurityAuthorizer {
    engine: Option<Arc<dyn PolicyEngine>>,
}

impl std::fmt::Debug for SecurityAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityAuthorizer")
            .field("enforcing", &self.is_enforcing())
            .finish()
    }
}

impl SecurityAuthorizer {
    /// Authorizer that allows everything.
    #[must_use]
    pub fn open() -> Self {
        Self { engine: None }
    }

    #[must_use]
    pub fn with_engine(engine: Arc<dyn PolicyEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    #[must_use]
    pub fn is_enforcing(&self) -> bool {
        self.engine.is_some()
    }

    /// Returns `AuthorizationDenied` naming the caller, resource and action.
    pub fn check_permission(
        &self,
        ctx: &CallerContext,
        resource: &str,
        action: &str,
    ) -> Result<(), KernelError> {
        if ctx.is_system() {
            return Ok(());
        }

        let Some(engine) = &self.engine else {
            return Ok(());
        };

        if engine.is_allowed(action, resource, ctx) {
            Ok(())
        } else {
            warn!(
                user_id = %ctx.user_id,
                resource = %resource,
                action = %action,
                "[Security] Authorization denied"
            );
            Err(KernelError::AuthorizationDenied {
                user_id: ctx.user_id.clone(),
                resource: resource.to_string(),
                action: action.to_string(),
            })
        }
    }

    /// Shorthand for a capability write into `realm`.
    pub fn authorize_capability_write(
        &self,
        ctx: &CallerContext,
        realm: &str,
    ) -> Result<(), KernelError> {
        self.check_permission(ctx, &capability_resource(realm), ACTION_WRITE)
    }
}
