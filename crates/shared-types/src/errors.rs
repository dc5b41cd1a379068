//! # Kernel Error Taxonomy
//!
//! Every public kernel operation returns [`KernelError`] on failure. Each
//! variant names the offending service or capability so a caller can decide
//! between retry and abort without parsing messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compliance::ComplianceFinding;
use crate::lifecycle::{LifecycleEvent, LifecycleState, StartReport};

/// Errors returned across the kernel's public boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// A non-terminal registration already exists under this name.
    #[error("service '{name}' is already registered and {state}")]
    DuplicateActiveRegistration { name: String, state: LifecycleState },

    /// The requested operation is not a legal move from the current state.
    #[error("service '{name}': cannot apply {event:?} while {from}")]
    InvalidLifecycleTransition {
        name: String,
        from: LifecycleState,
        event: LifecycleEvent,
    },

    /// The dependency graph has no topological order.
    ///
    /// Every strongly connected component is reported, members sorted.
    #[error("cyclic dependency: {}", format_cycles(.cycles))]
    CyclicDependency { cycles: Vec<Vec<String>> },

    /// Declared dependencies are not running yet. Retry with backoff.
    #[error("service '{name}' is waiting on dependencies: {}", .pending.join(", "))]
    DependencyNotReady { name: String, pending: Vec<String> },

    /// Structural validation produced Error findings; nothing was stored.
    #[error("capability '{target}' failed structural validation: {}", format_findings(.findings))]
    StructuralValidationFailed {
        target: String,
        findings: Vec<ComplianceFinding>,
    },

    /// The security authorizer refused the caller.
    #[error("user '{user_id}' is not authorized to {action} {resource}")]
    AuthorizationDenied {
        user_id: String,
        resource: String,
        action: String,
    },

    /// The tenant validator refused the caller.
    #[error("tenant access denied for user '{user_id}' (tenant {tenant:?}): {reason}")]
    TenantAccessDenied {
        user_id: String,
        tenant: Option<String>,
        reason: String,
    },

    /// No registration exists under this name.
    #[error("service '{name}' is not registered")]
    ServiceNotFound { name: String },

    /// `get_utility` was asked for a name outside the utility set.
    #[error("no utility named '{name}'")]
    UtilityNotFound { name: String },

    /// Another caller is already shutting this service down.
    #[error("service '{name}' is already stopping")]
    StopInProgress { name: String },

    /// No capability is registered under this key.
    #[error("capability '{key}' is not registered")]
    CapabilityNotFound { key: String },

    /// The owning service cannot publish capabilities in its current state.
    #[error("service '{name}' is not active (state: {state:?})")]
    ServiceNotActive {
        name: String,
        state: Option<LifecycleState>,
    },

    /// Registration input is malformed.
    #[error("invalid registration for '{name}': {reason}")]
    InvalidRegistration { name: String, reason: String },

    /// A lower version was offered for an existing capability.
    #[error("capability '{key}' is at {current}; refusing downgrade to {attempted}")]
    StaleVersion {
        key: String,
        current: String,
        attempted: String,
    },

    /// The service's own initialization failed.
    #[error("service '{name}' failed to start: {reason}")]
    StartFailed { name: String, reason: String },

    /// Initialization did not finish inside the start timeout. It keeps running.
    #[error("service '{name}' did not finish initializing in time")]
    StartTimedOut { name: String },

    /// A bulk start had at least one hard failure. Independent branches were still started.
    #[error("start_all failed at '{first_failure}': {reason}")]
    StartAllFailed {
        first_failure: String,
        reason: String,
        report: StartReport,
    },
}

/// Discriminant of [`KernelError`], for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    DuplicateActiveRegistration,
    InvalidLifecycleTransition,
    CyclicDependency,
    DependencyNotReady,
    StructuralValidationFailed,
    AuthorizationDenied,
    TenantAccessDenied,
    ServiceNotFound,
    UtilityNotFound,
    StopInProgress,
    CapabilityNotFound,
    ServiceNotActive,
    InvalidRegistration,
    StaleVersion,
    StartFailed,
    StartTimedOut,
    StartAllFailed,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateActiveRegistration => "duplicate_active_registration",
            Self::InvalidLifecycleTransition => "invalid_lifecycle_transition",
            Self::CyclicDependency => "cyclic_dependency",
            Self::DependencyNotReady => "dependency_not_ready",
            Self::StructuralValidationFailed => "structural_validation_failed",
            Self::AuthorizationDenied => "authorization_denied",
            Self::TenantAccessDenied => "tenant_access_denied",
            Self::ServiceNotFound => "service_not_found",
            Self::UtilityNotFound => "utility_not_found",
            Self::StopInProgress => "stop_in_progress",
            Self::CapabilityNotFound => "capability_not_found",
            Self::ServiceNotActive => "service_not_active",
            Self::InvalidRegistration => "invalid_registration",
            Self::StaleVersion => "stale_version",
            Self::StartFailed => "start_failed",
            Self::StartTimedOut => "start_timed_out",
            Self::StartAllFailed => "start_all_failed",
        }
    }
}

impl KernelError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateActiveRegistration { .. } => ErrorKind::DuplicateActiveRegistration,
            Self::InvalidLifecycleTransition { .. } => ErrorKind::InvalidLifecycleTransition,
            Self::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            Self::DependencyNotReady { .. } => ErrorKind::DependencyNotReady,
            Self::StructuralValidationFailed { .. } => ErrorKind::StructuralValidationFailed,
            Self::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
            Self::TenantAccessDenied { .. } => ErrorKind::TenantAccessDenied,
            Self::ServiceNotFound { .. } => ErrorKind::ServiceNotFound,
            Self::UtilityNotFound { .. } => ErrorKind::UtilityNotFound,
            Self::StopInProgress { .. } => ErrorKind::StopInProgress,
            Self::CapabilityNotFound { .. } => ErrorKind::CapabilityNotFound,
            Self::ServiceNotActive { .. } => ErrorKind::ServiceNotActive,
            Self::InvalidRegistration { .. } => ErrorKind::InvalidRegistration,
            Self::StaleVersion { .. } => ErrorKind::StaleVersion,
            Self::StartFailed { .. } => ErrorKind::StartFailed,
            Self::StartTimedOut { .. } => ErrorKind::StartTimedOut,
            Self::StartAllFailed { .. } => ErrorKind::StartAllFailed,
        }
    }

    /// Whether the caller should retry with backoff.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DependencyNotReady { .. } | Self::StartTimedOut { .. }
        )
    }
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| format!("[{}]", cycle.join(" -> ")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_findings(findings: &[ComplianceFinding]) -> String {
    findings
        .iter()
        .map(|f| format!("{} ({})", f.rule, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}
