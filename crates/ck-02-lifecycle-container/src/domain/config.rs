//! Container configuration.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Upper bound on waiting for dependencies, and separately on initialization.
    pub start_timeout: Duration,
    /// Upper bound on a single `shutdown` call.
    pub stop_timeout: Duration,
    /// Period of the health watcher. Also bounds each check.
    pub health_check_interval: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            start_timeout: Duration::from_secs(30),
            stop_timeout: Duration::from_secs(10),
            health_check_interval: Duration::from_secs(15),
        }
    }
}
