//! Ports for the Capability Registry.

pub mod inbound;
pub mod outbound;

pub use inbound::RegistryApi;
pub use outbound::ServiceDirectory;
