//! Compliance configuration.

use std::collections::BTreeSet;
use std::time::Duration;

/// Realms the platform is organised into. Anything else raises a Warning.
pub const STANDARD_REALMS: [&str; 7] = [
    "smart_city",
    "business_enablement",
    "journey",
    "solution",
    "experience",
    "agentic",
    "content",
];

#[derive(Debug, Clone)]
pub struct ComplianceConfig {
    /// Quiet period after a capability or lifecycle event before the corpus is rescanned.
    pub scan_interval: Duration,
    pub standard_realms: BTreeSet<String>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(5),
            standard_realms: STANDARD_REALMS.iter().map(ToString::to_string).collect(),
        }
    }
}
