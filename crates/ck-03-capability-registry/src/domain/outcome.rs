//! Result of an accepted registration call.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationOutcome {
    /// First registration under this key.
    Inserted,
    /// Replaced an equal or lower version.
    Superseded { previous: String },
    /// A downgrade under [`DowngradePolicy::Ignore`](super::DowngradePolicy::Ignore). Nothing changed.
    Ignored { current: String },
}

impl RegistrationOutcome {
    /// Metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Superseded { .. } => "superseded",
            Self::Ignored { .. } => "ignored",
        }
    }

    /// Whether the definition was written.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        !matches!(self, Self::Ignored { .. })
    }
}
