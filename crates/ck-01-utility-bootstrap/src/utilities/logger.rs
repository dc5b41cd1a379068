//! Logger factory handing out per-service loggers.

use std::sync::Arc;

use kernel_telemetry::{build_filter, TelemetryError};

/// Validated logging configuration shared by every service logger.
#[derive(Debug, Clone)]
pub struct LoggerFactory {
    directive: String,
}

impl LoggerFactory {
    /// Fails if `directive` is not a valid filter.
    pub fn new(directive: &str) -> Result<Self, TelemetryError> {
        build_filter(directive)?;
        Ok(Self {
            directive: directive.to_string(),
        })
    }

    /// The filter directive this factory was built with.
    #[must_use]
    pub fn directive(&self) -> &str {
        &self.directive
    }

    #[must_use]
    pub fn for_service(&self, service: &str) -> ServiceLogger {
        ServiceLogger {
            service: Arc::from(service),
        }
    }
}

/// Logger bound to one service name. Every event carries a `service` field.
#[derive(Debug, Clone)]
pub struct ServiceLogger {
    service: Arc<str>,
}

impl ServiceLogger {
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(service = %self.service, "{}", message);
    }

    pub fn info(&self, message: &str) {
        tracing::info!(service = %self.service, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(service = %self.service, "{}", message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(service = %self.service, "{}", message);
    }
}
