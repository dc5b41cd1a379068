//! Structured logging helpers.
//!
//! Every kernel log line carries a `component` field so JSON output can be
//! filtered per component (`lifecycle-container`, `capability-registry`, ...).
//! Per-service loggers add a `service` field on top of that.

/// Log with the standard `component` field.
///
/// ```rust,ignore
/// log_event!(info, "capability-registry", "Capability registered", key = %key);
/// ```
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a service-scoped event with the standard `component` and `service` fields.
#[macro_export]
macro_rules! log_service_event {
    ($level:ident, $component:expr, $service:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            service = %$service,
            $($($field)*,)?
            $msg
        )
    };
}
