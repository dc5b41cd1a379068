//! # Curator Kernel Runtime
//!
//! Assembles the kernel and exposes it to embedding processes. The
//! `curator-kernel` binary is a thin demo on top of this library.
//!
//! ## Layout
//!
//! - `container/` - [`KernelConfig`] and the [`Kernel`] assembly
//! - `adapters/` - port implementations bridging components
//! - `demo` - sample services and capabilities used by the binary and tests
//!
//! ## Startup Sequence
//!
//! 1. Load [`KernelConfig`] (defaults, then `CK_*` environment overrides)
//! 2. Validate it
//! 3. Bootstrap utilities; any failure aborts
//! 4. Wire bus, compliance, container and registry
//! 5. Spawn background tasks
//! 6. Services register, start, then publish capabilities

pub mod adapters;
pub mod container;
pub mod demo;
pub mod errors;

pub use adapters::ContainerDirectory;
pub use container::{
    ConfigError, Deregistration, Kernel, KernelConfig, KernelRegistry, SecurityConfig,
};
pub use errors::RuntimeError;
