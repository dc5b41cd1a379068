//! # Lifecycle Container
//!
//! Owns every service registration and drives each one through the
//! lifecycle state machine defined in `shared-types`.
//!
//! ## Startup
//!
//! ```text
//! register_service(a, deps=[])      register_service(b, deps=[a])
//!            │                                  │
//!            ▼                                  ▼
//!      [Registered] ── start(a) ──→ [Initializing] ──→ [Started]
//!                                                        │
//!      [Registered] ── start(b) waits on state changes ──┘
//!                      then ──→ [Initializing] ──→ [Started]
//! ```
//!
//! - `start` blocks up to `start_timeout` for dependencies, then returns
//!   `DependencyNotReady`. Failed or stopped dependencies fail fast.
//! - `initialize` runs on a spawned task. Dropping the caller's future does
//!   not cancel it; a start timeout leaves it running.
//! - `start_all` sorts the graph (Kahn, lexicographic ties), reports every
//!   cycle (Tarjan), and starts each wave of independent services
//!   concurrently.
//! - `stop_all` runs in reverse order. Stopping a service that running
//!   services still depend on is allowed but raises a warning finding.
//!
//! ## Health
//!
//! | Check result | From | To |
//! |--------------|------|----|
//! | `Degraded` | Started | Degraded |
//! | `Healthy` | Degraded | Started |
//! | `Unhealthy` | Started / Degraded | Failed |
//!
//! ## Locking
//!
//! One reader-writer lock guards the service table. It is never held across
//! an `.await`; hooks run on cloned `Arc<dyn ServiceInstance>` handles.

pub mod domain;
pub mod ports;
pub mod service;
pub mod watcher;

#[cfg(test)]
pub(crate) mod test_support;

pub use domain::*;
pub use ports::{LifecycleApi, ServiceInstance};
pub use service::LifecycleContainer;
pub use watcher::spawn_health_watcher;
