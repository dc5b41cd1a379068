//! # Adapters
//!
//! Port implementations that connect kernel components without making the
//! component crates depend on each other.

pub mod directory;

pub use directory::ContainerDirectory;
