//! # Kernel Container
//!
//! Configuration and assembly of every kernel component.
//!
//! - Utilities are bootstrapped before anything else exists
//! - Components talk through ports; adapters live in `crate::adapters`
//! - Background tasks share one shutdown signal

pub mod config;
pub mod kernel;

pub use config::{ConfigError, KernelConfig, SecurityConfig, DEFAULT_EVENT_BUS_CAPACITY};
pub use kernel::{Deregistration, Kernel, KernelRegistry};
