//! Registry configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happens when a lower version is offered for an existing capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DowngradePolicy {
    /// Fail with `StaleVersion`.
    #[default]
    Reject,
    /// Keep the stored version and report `Ignored`.
    Ignore,
}

impl FromStr for DowngradePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!("unknown downgrade policy '{other}' (expected reject or ignore)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub downgrade_policy: DowngradePolicy,
    /// How long a stopped or failed owner keeps its capabilities before
    /// `purge_expired` removes them.
    pub orphan_grace: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            downgrade_policy: DowngradePolicy::Reject,
            orphan_grace: Duration::from_secs(300),
        }
    }
}
