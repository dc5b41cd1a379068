//! Domain layer for the Lifecycle Container.

pub mod config;
pub mod errors;
pub mod graph;

pub use config::LifecycleConfig;
pub use errors::ServiceError;
pub use graph::{start_waves, topological_order, DependencyGraph};
