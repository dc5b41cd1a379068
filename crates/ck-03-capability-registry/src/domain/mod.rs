//! Domain layer for the Capability Registry.

pub mod config;
pub mod outcome;
pub mod versioning;

pub use config::{DowngradePolicy, RegistryConfig};
pub use outcome::RegistrationOutcome;
pub use versioning::{decide, VersionDecision};
