//! # Health Reporting Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::LifecycleState;

/// Result of a single service health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    /// Serving, with reduced capacity.
    Degraded(String),
    /// Not serving.
    Unhealthy(String),
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Timestamped check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
}

impl HealthRecord {
    #[must_use]
    pub fn now(status: HealthStatus) -> Self {
        Self {
            status,
            checked_at: Utc::now(),
        }
    }
}

/// Per-service entry of a [`HealthReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub name: String,
    pub state: LifecycleState,
    pub last_health: Option<HealthRecord>,
    /// Declared dependencies that are not currently running.
    pub unhealthy_dependencies: Vec<String>,
}

impl ServiceHealth {
    /// Whether this entry counts as fully healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.state == LifecycleState::Started
            && self.unhealthy_dependencies.is_empty()
            && self
                .last_health
                .as_ref()
                .map_or(true, |record| record.status.is_healthy())
    }
}

/// Aggregate status of the whole service graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallHealth {
    /// Every service is started and healthy.
    Healthy,
    /// At least one service is running, but not all are healthy.
    Degraded,
    /// No service is running.
    Unhealthy,
}

/// Structured health of every registered service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: OverallHealth,
    /// Every service, sorted by name. Unhealthy entries never hide healthy ones.
    pub services: Vec<ServiceHealth>,
    pub generated_at: DateTime<Utc>,
}

impl HealthReport {
    /// Aggregate per-service health.
    #[must_use]
    pub fn from_services(mut services: Vec<ServiceHealth>) -> Self {
        services.sort_by(|a, b| a.name.cmp(&b.name));

        let running = services.iter().filter(|s| s.state.is_running()).count();
        let healthy = services.iter().filter(|s| s.is_healthy()).count();

        let overall = if healthy == services.len() {
            OverallHealth::Healthy
        } else if running > 0 {
            OverallHealth::Degraded
        } else {
            OverallHealth::Unhealthy
        };

        Self {
            overall,
            services,
            generated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceHealth> {
        self.services.iter().find(|s| s.name == name)
    }
}
