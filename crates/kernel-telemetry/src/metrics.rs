//! Prometheus metrics for the Curator kernel.
//!
//! All metrics follow the naming convention: `ck_<component>_<metric>_<unit>`
//!
//! Each [`KernelMetrics`] owns its own `Registry`, so several kernels (for
//! example in parallel tests) never collide on registration.
//!
//! ## Metric Types
//!
//! - **Counter**: registrations, queries, transitions, findings
//! - **Gauge**: per-service health values
//! - **Histogram**: operation durations

use std::time::{Duration, Instant};

use prometheus::{
    exponential_buckets, CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounter,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

/// Handle to every kernel metric.
#[derive(Clone)]
pub struct KernelMetrics {
    registry: Registry,

    /// Capability registrations by outcome (inserted/superseded/ignored/rejected).
    pub capability_registrations: CounterVec,

    /// Route discovery queries served.
    pub route_queries: IntCounter,

    /// Lifecycle transitions by target state.
    pub lifecycle_transitions: CounterVec,

    /// Compliance findings recorded, by severity.
    pub compliance_findings: CounterVec,

    /// Service operations by service, operation and result.
    pub operations: CounterVec,

    /// Service operation duration.
    pub operation_duration: HistogramVec,

    /// Arbitrary per-service health gauges.
    pub service_health: GaugeVec,
}

fn init_err(e: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsInit(e.to_string())
}

impl KernelMetrics {
    /// Create and register every metric in a fresh registry.
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let capability_registrations = CounterVec::new(
            Opts::new(
                "ck_registry_capability_registrations_total",
                "Capability registrations by outcome",
            ),
            &["outcome"],
        )
        .map_err(init_err)?;

        let route_queries = IntCounter::new(
            "ck_registry_route_queries_total",
            "Route discovery queries served",
        )
        .map_err(init_err)?;

        let lifecycle_transitions = CounterVec::new(
            Opts::new(
                "ck_container_lifecycle_transitions_total",
                "Service lifecycle transitions by target state",
            ),
            &["state"],
        )
        .map_err(init_err)?;

        let compliance_findings = CounterVec::new(
            Opts::new(
                "ck_compliance_findings_total",
                "Compliance findings recorded by severity",
            ),
            &["severity"],
        )
        .map_err(init_err)?;

        let operations = CounterVec::new(
            Opts::new("ck_service_operations_total", "Service operations by result"),
            &["service", "operation", "result"],
        )
        .map_err(init_err)?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "ck_service_operation_duration_seconds",
                "Time spent in service operations",
            )
            .buckets(exponential_buckets(0.0001, 2.0, 16).map_err(init_err)?),
            &["service", "operation"],
        )
        .map_err(init_err)?;

        let service_health = GaugeVec::new(
            Opts::new("ck_service_health", "Per-service health gauges"),
            &["service", "metric"],
        )
        .map_err(init_err)?;

        registry
            .register(Box::new(capability_registrations.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(route_queries.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(lifecycle_transitions.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(compliance_findings.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(operations.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(operation_duration.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(service_health.clone()))
            .map_err(init_err)?;

        Ok(Self {
            registry,
            capability_registrations,
            route_queries,
            lifecycle_transitions,
            compliance_findings,
            operations,
            operation_duration,
            service_health,
        })
    }

    /// Record one service operation.
    pub fn observe_operation(&self, service: &str, operation: &str, success: bool, elapsed: Duration) {
        let result = if success { "ok" } else { "error" };
        self.operations
            .with_label_values(&[service, operation, result])
            .inc();
        self.operation_duration
            .with_label_values(&[service, operation])
            .observe(elapsed.as_secs_f64());
    }

    /// Encode all metrics as Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(init_err)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }

    /// The underlying registry, for exposition by an outer HTTP layer.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Timer guard for automatic histogram observation.
pub struct OperationTimer {
    metrics: KernelMetrics,
    service: String,
    operation: String,
    start: Instant,
    success: bool,
}

impl OperationTimer {
    /// Start timing an operation. Recorded as a failure unless [`OperationTimer::succeed`] is called.
    pub fn new(metrics: &KernelMetrics, service: &str, operation: &str) -> Self {
        Self {
            metrics: metrics.clone(),
            service: service.to_string(),
            operation: operation.to_string(),
            start: Instant::now(),
            success: false,
        }
    }

    /// Time since the timer was started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Mark the operation successful.
    pub fn succeed(mut self) {
        self.success = true;
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.metrics.observe_operation(
            &self.service,
            &self.operation,
            self.success,
            self.start.elapsed(),
        );
    }
}
