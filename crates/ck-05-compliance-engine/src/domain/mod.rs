//! Domain layer for the Compliance Engine.

pub mod config;
pub mod rules;
pub mod store;
pub mod violations;

pub use config::{ComplianceConfig, STANDARD_REALMS};
pub use rules::{CorpusScan, StructuralValidator, ALLOWED_METHODS};
pub use store::FindingStore;
pub use violations::{ScanReport, ViolationFilter, ViolationSummary};
