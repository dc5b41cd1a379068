//! Ports for the Lifecycle Container.

pub mod inbound;
pub mod outbound;

pub use inbound::LifecycleApi;
pub use outbound::ServiceInstance;
