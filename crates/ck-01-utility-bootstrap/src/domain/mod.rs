//! Domain layer for the Utility Bootstrap.

pub mod config;
pub mod errors;
pub mod kind;

pub use config::{BootstrapConfig, DEFAULT_ADMIN_ROLE, DEFAULT_ERROR_AUDIT_CAPACITY};
pub use errors::BootstrapError;
pub use kind::UtilityKind;
