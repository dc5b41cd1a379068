//! Driven Ports (SPI)

use shared_types::{RegisteredCapability, ServiceSnapshot};

/// Read-only snapshot of everything a corpus scan inspects.
///
/// The engine never writes through this port.
pub trait CorpusSource: Send + Sync {
    fn capabilities(&self) -> Vec<RegisteredCapability>;

    fn services(&self) -> Vec<ServiceSnapshot>;
}
