//! # Kernel Configuration
//!
//! Unified configuration for every kernel component.
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CK_START_TIMEOUT_MS` | `lifecycle.start_timeout` |
//! | `CK_STOP_TIMEOUT_MS` | `lifecycle.stop_timeout` |
//! | `CK_HEALTH_INTERVAL_MS` | `lifecycle.health_check_interval` |
//! | `CK_DOWNGRADE_POLICY` | `registry.downgrade_policy` (`reject`/`ignore`) |
//! | `CK_ORPHAN_GRACE_SECS` | `registry.orphan_grace` |
//! | `CK_SCAN_INTERVAL_MS` | `compliance.scan_interval` |
//! | `CK_ENFORCE_AUTHZ` | `security.enforce_authorization` |
//! | `CK_ADMIN_ROLE` | `security.admin_role` |
//! | `CK_KNOWN_TENANTS` | `security.known_tenants` (comma separated) |
//! | `CK_ERROR_AUDIT_CAPACITY` | `security.error_audit_capacity` |
//! | `CK_EVENT_BUS_CAPACITY` | `event_bus_capacity` |
//!
//! Telemetry variables are read by [`TelemetryConfig::from_env`].

use std::str::FromStr;
use std::time::Duration;

use ck_01_utility_bootstrap::{BootstrapConfig, DEFAULT_ADMIN_ROLE, DEFAULT_ERROR_AUDIT_CAPACITY};
use ck_02_lifecycle_container::LifecycleConfig;
use ck_03_capability_registry::{DowngradePolicy, RegistryConfig};
use ck_05_compliance_engine::ComplianceConfig;
use kernel_telemetry::TelemetryConfig;
use thiserror::Error;

/// Default broadcast capacity of the kernel event bus.
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;

/// Complete kernel configuration.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Start, stop and health-check timing.
    pub lifecycle: LifecycleConfig,
    /// Version conflict policy and orphan grace period.
    pub registry: RegistryConfig,
    /// Scan debounce and the standard realm list.
    pub compliance: ComplianceConfig,
    /// Authorization and tenancy.
    pub security: SecurityConfig,
    /// Logging, span export and metrics.
    pub telemetry: TelemetryConfig,
    /// Broadcast capacity of the event bus.
    pub event_bus_capacity: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleConfig::default(),
            registry: RegistryConfig::default(),
            compliance: ComplianceConfig::default(),
            security: SecurityConfig::default(),
            telemetry: TelemetryConfig::default(),
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
        }
    }
}

/// Authorization and tenancy configuration.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Install the realm permission policy. Off means open access.
    pub enforce_authorization: bool,
    /// Role that passes every realm permission check.
    pub admin_role: String,
    /// Tenants accepted at startup. Unknown tenants are denied.
    pub known_tenants: Vec<String>,
    /// Recent errors kept by the error auditor.
    pub error_audit_capacity: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enforce_authorization: false,
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            known_tenants: Vec::new(),
            error_audit_capacity: DEFAULT_ERROR_AUDIT_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A timeout or interval is zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    /// A capacity is zero.
    #[error("{field} must be at least 1")]
    ZeroCapacity { field: &'static str },

    /// No standard realms are configured.
    #[error("compliance.standard_realms must not be empty")]
    EmptyRealms,

    /// Authorization is enforced with no admin role.
    #[error("security.admin_role must be set when authorization is enforced")]
    MissingAdminRole,

    /// An environment variable could not be parsed.
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}

impl KernelConfig {
    /// Defaults overridden by `CK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            telemetry: TelemetryConfig::from_env(),
            ..Self::default()
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = parse_var::<u64, _>(&lookup, "CK_START_TIMEOUT_MS")? {
            self.lifecycle.start_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "CK_STOP_TIMEOUT_MS")? {
            self.lifecycle.stop_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "CK_HEALTH_INTERVAL_MS")? {
            self.lifecycle.health_check_interval = Duration::from_millis(ms);
        }
        if let Some(policy) = parse_var::<DowngradePolicy, _>(&lookup, "CK_DOWNGRADE_POLICY")? {
            self.registry.downgrade_policy = policy;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "CK_ORPHAN_GRACE_SECS")? {
            self.registry.orphan_grace = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "CK_SCAN_INTERVAL_MS")? {
            self.compliance.scan_interval = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup("CK_ENFORCE_AUTHZ") {
            self.security.enforce_authorization = parse_flag("CK_ENFORCE_AUTHZ", &raw)?;
        }
        if let Some(role) = lookup("CK_ADMIN_ROLE") {
            self.security.admin_role = role.trim().to_string();
        }
        if let Some(raw) = lookup("CK_KNOWN_TENANTS") {
            self.security.known_tenants = raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(n) = parse_var::<usize, _>(&lookup, "CK_ERROR_AUDIT_CAPACITY")? {
            self.security.error_audit_capacity = n;
        }
        if let Some(n) = parse_var::<usize, _>(&lookup, "CK_EVENT_BUS_CAPACITY")? {
            self.event_bus_capacity = n;
        }
        Ok(())
    }

    /// Reject configurations the kernel cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("lifecycle.start_timeout", self.lifecycle.start_timeout),
            ("lifecycle.stop_timeout", self.lifecycle.stop_timeout),
            ("lifecycle.health_check_interval", self.lifecycle.health_check_interval),
            ("compliance.scan_interval", self.compliance.scan_interval),
        ];
        if let Some((field, _)) = durations.iter().find(|(_, d)| d.is_zero()) {
            return Err(ConfigError::ZeroDuration { field });
        }
        if self.compliance.standard_realms.is_empty() {
            return Err(ConfigError::EmptyRealms);
        }
        if self.security.enforce_authorization && self.security.admin_role.trim().is_empty() {
            return Err(ConfigError::MissingAdminRole);
        }
        if self.security.error_audit_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "security.error_audit_capacity",
            });
        }
        if self.event_bus_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "event_bus_capacity",
            });
        }
        Ok(())
    }

    /// The subset handed to the utility bootstrap.
    #[must_use]
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            log_level: self.telemetry.log_level.clone(),
            enforce_authorization: self.security.enforce_authorization,
            admin_role: self.security.admin_role.clone(),
            known_tenants: self.security.known_tenants.clone(),
            error_audit_capacity: self.security.error_audit_capacity,
        }
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                var: var.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
