//! Ports for the Compliance Engine.

pub mod inbound;
pub mod outbound;

pub use inbound::ComplianceApi;
pub use outbound::CorpusSource;
