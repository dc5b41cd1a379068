//! Closed set of utility kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::BootstrapError;

/// Every utility the bootstrap constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityKind {
    Logger,
    Telemetry,
    Security,
    Tenant,
    ErrorHandler,
    Health,
}

impl UtilityKind {
    /// Construction order. Later utilities may log through earlier ones.
    pub const CONSTRUCTION_ORDER: [UtilityKind; 6] = [
        UtilityKind::Logger,
        UtilityKind::Telemetry,
        UtilityKind::Security,
        UtilityKind::Tenant,
        UtilityKind::ErrorHandler,
        UtilityKind::Health,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logger => "logger",
            Self::Telemetry => "telemetry",
            Self::Security => "security",
            Self::Tenant => "tenant",
            Self::ErrorHandler => "error_handler",
            Self::Health => "health",
        }
    }

    /// Logger and security authorizer have no fallback.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Logger | Self::Security)
    }
}

impl fmt::Display for UtilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UtilityKind {
    type Err = BootstrapError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::CONSTRUCTION_ORDER
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| BootstrapError::UtilityNotFound {
                name: name.to_string(),
            })
    }
}
