//! Bootstrap errors. Every construction failure is fatal to process startup.

use thiserror::Error;

use super::kind::UtilityKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// Logger or security authorizer could not be built.
    #[error("mandatory utility '{kind}' failed to construct: {reason}")]
    MandatoryUtilityFailed { kind: UtilityKind, reason: String },

    /// A non-mandatory utility could not be built. Still fatal; there is no degraded mode.
    #[error("utility '{kind}' failed to construct: {reason}")]
    UtilityFailed { kind: UtilityKind, reason: String },

    /// No utility answers to this name.
    #[error("utility '{name}' not found")]
    UtilityNotFound { name: String },
}

impl BootstrapError {
    pub(crate) fn construction(kind: UtilityKind, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if kind.is_mandatory() {
            Self::MandatoryUtilityFailed { kind, reason }
        } else {
            Self::UtilityFailed { kind, reason }
        }
    }

    /// The utility whose construction failed, if any.
    #[must_use]
    pub fn failed_kind(&self) -> Option<UtilityKind> {
        match self {
            Self::MandatoryUtilityFailed { kind, .. } | Self::UtilityFailed { kind, .. } => {
                Some(*kind)
            }
            Self::UtilityNotFound { .. } => None,
        }
    }
}
