//! Bootstrap configuration.

/// Default capacity of the error auditor ring.
pub const DEFAULT_ERROR_AUDIT_CAPACITY: usize = 256;

/// Role that passes every realm permission check under the default policy.
pub const DEFAULT_ADMIN_ROLE: &str = "platform_admin";

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Filter directive validated by the logger factory.
    pub log_level: String,
    /// Install the realm permission policy when no engine is supplied.
    pub enforce_authorization: bool,
    /// Role treated as platform administrator by the realm policy.
    pub admin_role: String,
    /// Tenants accepted by the tenant validator at startup.
    pub known_tenants: Vec<String>,
    /// Recent errors kept by the error auditor.
    pub error_audit_capacity: usize,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enforce_authorization: false,
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            known_tenants: Vec::new(),
            error_audit_capacity: DEFAULT_ERROR_AUDIT_CAPACITY,
        }
    }
}
