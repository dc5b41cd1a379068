//! Overwrite rule for capabilities sharing a key.
//!
//! | Incoming vs stored | Result |
//! |--------------------|--------|
//! | no stored entry | insert |
//! | greater | replace |
//! | equal | replace (flagged when the content differs) |
//! | lower | `StaleVersion` or ignore, per [`DowngradePolicy`] |

use semver::Version;
use shared_types::{KernelError, RegisteredCapability};

use super::DowngradePolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionDecision {
    Insert,
    Replace {
        previous: String,
        /// Same version, different fingerprint.
        unbumped_change: bool,
    },
    Ignore {
        current: String,
    },
}

/// Apply the overwrite rule.
///
/// Both versions must parse; structural validation guarantees that for
/// anything that reached the table.
pub fn decide(
    existing: Option<&RegisteredCapability>,
    incoming: &RegisteredCapability,
    policy: DowngradePolicy,
) -> Result<VersionDecision, KernelError> {
    let Some(existing) = existing else {
        return Ok(VersionDecision::Insert);
    };

    let key = incoming.key().to_string();
    let parse = |raw: &str| {
        Version::parse(raw).map_err(|e| KernelError::InvalidRegistration {
            name: key.clone(),
            reason: format!("version '{raw}' is not semantic: {e}"),
        })
    };
    let current = parse(&existing.definition.version)?;
    let attempted = parse(&incoming.definition.version)?;

    if attempted >= current {
        return Ok(VersionDecision::Replace {
            previous: existing.definition.version.clone(),
            unbumped_change: attempted == current && existing.fingerprint != incoming.fingerprint,
        });
    }

    match policy {
        DowngradePolicy::Reject => Err(KernelError::StaleVersion {
            key,
            current: existing.definition.version.clone(),
            attempted: incoming.definition.version.clone(),
        }),
        DowngradePolicy::Ignore => Ok(VersionDecision::Ignore {
            current: existing.definition.version.clone(),
        }),
    }
}
