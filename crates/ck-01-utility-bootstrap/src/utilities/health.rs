//! Health aggregation over per-service entries.

use parking_lot::RwLock;
use shared_types::{HealthReport, ServiceHealth};

/// Builds [`HealthReport`]s and remembers the latest one.
#[derive(Debug, Default)]
pub struct HealthAggregator {
    last: RwLock<Option<HealthReport>>,
}

impl HealthAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aggregate(&self, services: Vec<ServiceHealth>) -> HealthReport {
        let report = HealthReport::from_services(services);
        *self.last.write() = Some(report.clone());
        report
    }

    /// The most recent report, if any was built.
    #[must_use]
    pub fn last_report(&self) -> Option<HealthReport> {
        self.last.read().clone()
    }
}
