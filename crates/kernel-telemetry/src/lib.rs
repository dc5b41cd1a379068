//! # Kernel Telemetry
//!
//! Logging, tracing export and metrics for the Curator kernel.
//!
//! ## Components
//!
//! - Structured logs via `tracing` (pretty or JSON)
//! - Optional span export over OTLP via OpenTelemetry
//! - Per-instance Prometheus metrics ([`KernelMetrics`])
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kernel_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).await?;
//!     // kernel runs here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | `http://localhost:4317` | OTLP collector |
//! | `OTEL_SERVICE_NAME` | `curator-kernel` | Service name in traces |
//! | `CK_OTLP_ENABLED` | `false` | Export spans |
//! | `CK_LOG_LEVEL` | `info` | Log filter directive |
//! | `CK_JSON_LOGS` | `false` | JSON log lines |

mod config;
mod logging;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{KernelMetrics, OperationTimer};
pub use tracing_setup::{build_filter, init_tracing, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize OpenTelemetry tracer: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging/tracing and create the metrics registry.
///
/// The returned guard must be held for the lifetime of the process; dropping
/// it flushes pending spans.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = KernelMetrics::new()?;
    let tracing = tracing_setup::init_tracing(&config).await?;

    Ok(TelemetryGuard {
        _tracing: tracing,
        metrics,
    })
}

/// Guard that keeps telemetry active. Drop to flush and shut down.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    metrics: KernelMetrics,
}

impl TelemetryGuard {
    /// Metrics created alongside the subscriber.
    #[must_use]
    pub fn metrics(&self) -> &KernelMetrics {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Convenience macro for recording a metric with a value.
#[macro_export]
macro_rules! metric_set {
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).set($value)
    };
}
