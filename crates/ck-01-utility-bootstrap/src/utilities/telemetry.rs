//! Telemetry utility: metrics recording for services and kernel components.

use std::time::Duration;

use kernel_telemetry::{KernelMetrics, OperationTimer, TelemetryError};

#[derive(Clone)]
pub struct TelemetrySink {
    metrics: KernelMetrics,
}

impl TelemetrySink {
    pub fn new() -> Result<Self, TelemetryError> {
        Ok(Self {
            metrics: KernelMetrics::new()?,
        })
    }

    /// Wrap an existing metrics handle (e.g. the one owned by the telemetry guard).
    #[must_use]
    pub fn from_metrics(metrics: KernelMetrics) -> Self {
        Self { metrics }
    }

    pub fn record_operation(&self, service: &str, operation: &str, success: bool, elapsed: Duration) {
        self.metrics
            .observe_operation(service, operation, success, elapsed);
    }

    /// Time an operation; it counts as failed unless the timer is marked successful.
    #[must_use]
    pub fn start_operation(&self, service: &str, operation: &str) -> OperationTimer {
        OperationTimer::new(&self.metrics, service, operation)
    }

    pub fn record_health_metric(&self, service: &str, name: &str, value: f64) {
        self.metrics
            .service_health
            .with_label_values(&[service, name])
            .set(value);
    }

    #[must_use]
    pub fn metrics(&self) -> &KernelMetrics {
        &self.metrics
    }

    /// Prometheus text exposition of every kernel metric.
    pub fn encode_metrics(&self) -> Result<String, TelemetryError> {
        self.metrics.encode()
    }
}
