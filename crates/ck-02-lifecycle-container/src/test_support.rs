//! Fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ck_01_utility_bootstrap::{BootstrapConfig, UtilityBootstrap};
use parking_lot::Mutex;
use shared_types::HealthStatus;

use crate::domain::{LifecycleConfig, ServiceError};
use crate::ports::ServiceInstance;
use crate::service::LifecycleContainer;

pub(crate) fn container() -> LifecycleContainer {
    container_with(LifecycleConfig {
        start_timeout: Duration::from_secs(2),
        ..LifecycleConfig::default()
    })
}

pub(crate) fn container_with(config: LifecycleConfig) -> LifecycleContainer {
    let utilities = UtilityBootstrap::new(BootstrapConfig::default())
        .bootstrap()
        .unwrap();
    LifecycleContainer::new(Arc::new(utilities), config)
}

pub(crate) struct TestService {
    init_delay: Duration,
    init_error: Option<String>,
    shutdown_error: Option<String>,
    shutdown_delay: Duration,
    shutdown_calls: AtomicUsize,
    health: Mutex<HealthStatus>,
}

impl TestService {
    fn build(init_delay: Duration, init_error: Option<&str>, shutdown_error: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            init_delay,
            init_error: init_error.map(ToString::to_string),
            shutdown_error: shutdown_error.map(ToString::to_string),
            shutdown_delay: Duration::ZERO,
            shutdown_calls: AtomicUsize::new(0),
            health: Mutex::new(HealthStatus::Healthy),
        })
    }

    pub(crate) fn ok() -> Arc<Self> {
        Self::build(Duration::ZERO, None, None)
    }

    pub(crate) fn failing(reason: &str) -> Arc<Self> {
        Self::build(Duration::ZERO, Some(reason), None)
    }

    pub(crate) fn failing_shutdown(reason: &str) -> Arc<Self> {
        Self::build(Duration::ZERO, None, Some(reason))
    }

    pub(crate) fn slow(delay: Duration) -> Arc<Self> {
        Self::build(delay, None, None)
    }

    pub(crate) fn slow_shutdown(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            init_delay: Duration::ZERO,
            init_error: None,
            shutdown_error: None,
            shutdown_delay: delay,
            shutdown_calls: AtomicUsize::new(0),
            health: Mutex::new(HealthStatus::Healthy),
        })
    }

    pub(crate) fn shutdown_calls(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_health(&self, status: HealthStatus) {
        *self.health.lock() = status;
    }
}

#[async_trait]
impl ServiceInstance for TestService {
    async fn initialize(&self) -> Result<(), ServiceError> {
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }
        match &self.init_error {
            Some(reason) => Err(ServiceError::new(reason.clone())),
            None => Ok(()),
        }
    }

    async fn shutdown(&self) -> Result<(), ServiceError> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        if !self.shutdown_delay.is_zero() {
            tokio::time::sleep(self.shutdown_delay).await;
        }
        match &self.shutdown_error {
            Some(reason) => Err(ServiceError::new(reason.clone())),
            None => Ok(()),
        }
    }

    async fn health_check(&self) -> HealthStatus {
        self.health.lock().clone()
    }
}
