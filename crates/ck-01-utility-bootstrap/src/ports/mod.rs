//! Ports for the Utility Bootstrap.

pub mod outbound;

pub use outbound::PolicyEngine;
