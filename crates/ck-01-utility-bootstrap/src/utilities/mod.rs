//! The six cross-cutting utilities.

pub mod error_auditor;
pub mod health;
pub mod logger;
pub mod security;
pub mod telemetry;
pub mod tenant;

pub use error_auditor::{AuditedError, ErrorAuditor};
pub use health::HealthAggregator;
pub use logger::{LoggerFactory, ServiceLogger};
pub use security::{capability_resource, RealmPermissionPolicy, SecurityAuthorizer, ACTION_WRITE};
pub use telemetry::TelemetrySink;
pub use tenant::TenantValidator;
