//! # Shared Types Crate
//!
//! Domain entities shared by every Curator kernel component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: capability definitions, contracts, lifecycle
//!   states and compliance findings are defined once, here.
//! - **Closed Contract Kinds**: contract payloads are a tagged union keyed by
//!   [`ContractKind`]; there is no untyped payload map.
//! - **Total State Machine**: [`LifecycleState::transition`] is defined for
//!   every (state, event) pair and returns an error for illegal moves.

pub mod compliance;
pub mod entities;
pub mod errors;
pub mod health;
pub mod lifecycle;
pub mod security;

pub use compliance::*;
pub use entities::*;
pub use errors::*;
pub use health::*;
pub use lifecycle::*;
pub use security::*;
