//! Shared fixtures for integration tests and benchmarks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use ck_02_lifecycle_container::{ServiceError, ServiceInstance};
use kernel_runtime::{Kernel, KernelConfig};
use shared_types::{CapabilityDefinition, Contract, HealthStatus, RestApiContract, TenantScope};

/// Config with timeouts short enough for tests.
pub fn test_config() -> KernelConfig {
    let mut config = KernelConfig::default();
    config.lifecycle.start_timeout = Duration::from_secs(2);
    config.lifecycle.stop_timeout = Duration::from_secs(1);
    config.lifecycle.health_check_interval = Duration::from_millis(20);
    config.compliance.scan_interval = Duration::from_millis(20);
    config
}

pub fn kernel() -> Kernel {
    kernel_with(|_| {})
}

pub fn kernel_with(customize: impl FnOnce(&mut KernelConfig)) -> Kernel {
    let mut config = test_config();
    customize(&mut config);
    match Kernel::new(config) {
        Ok(kernel) => kernel,
        Err(e) => panic!("test kernel failed to assemble: {e}"),
    }
}

/// Ordered record of lifecycle calls across every service sharing it.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Position of `entry`, if recorded.
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == entry)
    }
}

/// Service that records `init:<name>`, `ready:<name>` and `stop:<name>`.
pub struct RecordingService {
    name: String,
    log: CallLog,
    init_delay: Duration,
    init_failure: Option<String>,
    health: Mutex<HealthStatus>,
}

impl RecordingService {
    pub fn new(name: &str, log: &CallLog) -> Arc<Self> {
        Self::build(name, log, Duration::ZERO, None)
    }

    pub fn slow(name: &str, log: &CallLog, init_delay: Duration) -> Arc<Self> {
        Self::build(name, log, init_delay, None)
    }

    pub fn failing(name: &str, log: &CallLog, reason: &str) -> Arc<Self> {
        Self::build(name, log, Duration::ZERO, Some(reason.to_string()))
    }

    fn build(
        name: &str,
        log: &CallLog,
        init_delay: Duration,
        init_failure: Option<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            init_delay,
            init_failure,
            health: Mutex::new(HealthStatus::Healthy),
        })
    }

    pub fn set_health(&self, status: HealthStatus) {
        *self.health.lock() = status;
    }
}

#[async_trait]
impl ServiceInstance for RecordingService {
    async fn initialize(&self) -> Result<(), ServiceError> {
        self.log.push(format!("init:{}", self.name));
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }
        if let Some(reason) = &self.init_failure {
            return Err(ServiceError::new(reason.clone()));
        }
        self.log.push(format!("ready:{}", self.name));
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ServiceError> {
        self.log.push(format!("stop:{}", self.name));
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        self.health.lock().clone()
    }
}

/// A valid definition in `realm`, exposed as `POST /<realm>/<name>`.
pub fn capability(realm: &str, name: &str, service: &str, version: &str) -> CapabilityDefinition {
    CapabilityDefinition::new(realm, name, service, "TestProtocol")
        .with_version(version)
        .with_contract(Contract::RestApi(RestApiContract {
            endpoint: format!("/{realm}/{name}"),
            method: "POST".to_string(),
            handler: name.to_string(),
        }))
}

/// Register `name` with no dependencies and bring it to Started.
pub async fn start_service(kernel: &Kernel, name: &str, log: &CallLog) -> Arc<RecordingService> {
    let service = RecordingService::new(name, log);
    if let Err(e) = kernel
        .container()
        .register_service(name, service.clone(), vec![], TenantScope::Global)
    {
        panic!("register {name}: {e}");
    }
    if let Err(e) = kernel.container().start(name).await {
        panic!("start {name}: {e}");
    }
    service
}

/// Poll `check` until it holds or `within` elapses.
pub async fn eventually<F>(within: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
