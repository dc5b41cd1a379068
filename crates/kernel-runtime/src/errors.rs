//! Runtime assembly errors.

use ck_01_utility_bootstrap::BootstrapError;
use thiserror::Error;

use crate::container::ConfigError;

/// Why the kernel could not be assembled. Both are fatal to startup.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A utility failed to construct.
    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),
}
