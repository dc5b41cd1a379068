//! # Utility Bootstrap
//!
//! Eagerly constructs the kernel's cross-cutting utilities before any service
//! may start or any capability may be published.
//!
//! ## Construction Order
//!
//! | # | Utility | Name | Mandatory |
//! |---|---------|------|-----------|
//! | 1 | [`LoggerFactory`] | `logger` | yes |
//! | 2 | [`TelemetrySink`] | `telemetry` | no |
//! | 3 | [`SecurityAuthorizer`] | `security` | yes |
//! | 4 | [`TenantValidator`] | `tenant` | no |
//! | 5 | [`ErrorAuditor`] | `error_handler` | no |
//! | 6 | [`HealthAggregator`] | `health` | no |
//!
//! Any construction failure aborts bootstrap. There is no degraded-utility
//! mode: a [`Utilities`] value exists only when all six were built.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ck_01_utility_bootstrap::{BootstrapConfig, UtilityBootstrap, UtilityKind};
//!
//! let utilities = UtilityBootstrap::new(BootstrapConfig::default()).bootstrap()?;
//! let logger = utilities.logger().for_service("content_service");
//! let security = utilities.get_utility_by_name("security")?;
//! ```

pub mod domain;
pub mod ports;
pub mod service;
pub mod utilities;

pub use domain::*;
pub use ports::PolicyEngine;
pub use service::{Utilities, Utility, UtilityBootstrap};
pub use utilities::*;
