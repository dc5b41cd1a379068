//! # Kernel
//!
//! Holds every kernel component and owns their background tasks.
//!
//! ## Assembly Order
//!
//! ```text
//! KernelConfig::validate
//!        │
//!        ▼
//! UtilityBootstrap ──► Utilities (fatal on any failure)
//!        │
//!        ▼
//! InMemoryEventBus
//!        │
//!        ▼
//! ComplianceEngine (metrics, publisher)
//!        │
//!        ▼
//! LifecycleContainer (publisher, finding sink = compliance)
//!        │
//!        ▼
//! CapabilityRegistry (ContainerDirectory, compliance, publisher)
//! ```
//!
//! ## Background Tasks
//!
//! - Health watcher (every `lifecycle.health_check_interval`)
//! - Compliance scanner (debounced by `compliance.scan_interval`)
//! - Orphan purge (every `registry.orphan_grace`)
//!
//! All three stop on [`Kernel::shutdown`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use ck_01_utility_bootstrap::{TelemetrySink, Utilities, Utility, UtilityBootstrap};
use ck_02_lifecycle_container::{spawn_health_watcher, LifecycleContainer};
use ck_03_capability_registry::{CapabilityRegistry, RegistryApi};
use ck_05_compliance_engine::{spawn_scanner, ComplianceApi, ComplianceEngine, CorpusSource};
use kernel_telemetry::{log_event, KernelMetrics, TelemetryError};
use shared_bus::{EventFilter, EventPublisher, EventSubscriber, InMemoryEventBus, Subscription};
use shared_types::{CapabilityKey, HealthReport, KernelError, ServiceSnapshot};

use crate::adapters::ContainerDirectory;
use crate::container::config::KernelConfig;
use crate::errors::RuntimeError;

const COMPONENT: &str = "kernel-runtime";

/// Registry wired to the live lifecycle container.
pub type KernelRegistry = CapabilityRegistry<ContainerDirectory>;

/// Result of [`Kernel::deregister`].
#[derive(Debug, Clone)]
pub struct Deregistration {
    /// The service as it was when removed.
    pub service: ServiceSnapshot,
    /// Capabilities withdrawn along with it.
    pub removed_capabilities: Vec<CapabilityKey>,
}

/// The assembled kernel.
pub struct Kernel {
    config: KernelConfig,
    utilities: Arc<Utilities>,
    bus: Arc<InMemoryEventBus>,
    compliance: Arc<ComplianceEngine>,
    container: LifecycleContainer,
    registry: Arc<KernelRegistry>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("services", &self.container.len())
            .field("capabilities", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl Kernel {
    /// Validate `config` and assemble every component with a fresh metrics registry.
    pub fn new(config: KernelConfig) -> Result<Self, RuntimeError> {
        Self::assemble(config, None)
    }

    /// Like [`Kernel::new`], recording into `metrics` (e.g. the telemetry guard's).
    pub fn with_metrics(config: KernelConfig, metrics: KernelMetrics) -> Result<Self, RuntimeError> {
        Self::assemble(config, Some(metrics))
    }

    fn assemble(config: KernelConfig, metrics: Option<KernelMetrics>) -> Result<Self, RuntimeError> {
        config.validate()?;

        let mut bootstrap = UtilityBootstrap::new(config.bootstrap_config());
        if let Some(metrics) = metrics {
            bootstrap = bootstrap.with_telemetry(TelemetrySink::from_metrics(metrics));
        }
        let utilities = Arc::new(bootstrap.bootstrap()?);

        let bus = Arc::new(InMemoryEventBus::with_capacity(config.event_bus_capacity));
        let publisher: Arc<dyn EventPublisher> = bus.clone();

        let compliance = Arc::new(
            ComplianceEngine::new(config.compliance.clone())
                .with_metrics(utilities.telemetry().metrics().clone())
                .with_publisher(Arc::clone(&publisher)),
        );

        let container = LifecycleContainer::new(Arc::clone(&utilities), config.lifecycle.clone())
            .with_publisher(Arc::clone(&publisher))
            .with_finding_sink(compliance.clone());

        let registry = Arc::new(
            CapabilityRegistry::new(
                config.registry.clone(),
                ContainerDirectory::new(container.clone()),
                Arc::clone(&utilities),
                Arc::clone(&compliance),
            )
            .with_publisher(publisher),
        );

        let (shutdown_tx, _) = watch::channel(false);

        log_event!(
            info,
            COMPONENT,
            "[Kernel] Assembled",
            downgrade_policy = ?config.registry.downgrade_policy,
            enforce_authorization = config.security.enforce_authorization
        );

        Ok(Self {
            config,
            utilities,
            bus,
            compliance,
            container,
            registry,
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        })
    }

    // =========================================================================
    // COMPONENTS
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    #[must_use]
    pub fn utilities(&self) -> &Arc<Utilities> {
        &self.utilities
    }

    /// Name lookup over the utility set (`logger`, `telemetry`, `security`, ...).
    pub fn get_utility(&self, name: &str) -> Result<Utility<'_>, KernelError> {
        self.utilities
            .get_utility_by_name(name)
            .map_err(|_| KernelError::UtilityNotFound {
                name: name.to_string(),
            })
    }

    #[must_use]
    pub fn container(&self) -> &LifecycleContainer {
        &self.container
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<KernelRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn compliance(&self) -> &Arc<ComplianceEngine> {
        &self.compliance
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// Subscribe to kernel events matching `filter`.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    // =========================================================================
    // CROSS-COMPONENT OPERATIONS
    // =========================================================================

    /// Remove `name` from the container, then withdraw its capabilities and routes.
    pub fn deregister(&self, name: &str) -> Result<Deregistration, KernelError> {
        let service = self.container.deregister(name)?;
        let removed_capabilities = self.registry.remove_service_capabilities(name);
        log_event!(
            info,
            COMPONENT,
            "[Kernel] Service deregistered",
            service = name,
            capabilities = removed_capabilities.len()
        );
        Ok(Deregistration {
            service,
            removed_capabilities,
        })
    }

    /// Aggregated health of every registered service.
    pub fn get_health(&self) -> HealthReport {
        self.container.get_health()
    }

    /// Run the corpus rules now, outside the background scanner.
    pub fn scan_now(&self) -> ck_05_compliance_engine::ScanReport {
        self.compliance.scan_corpus(self.registry.as_ref())
    }

    /// Prometheus text exposition of every kernel metric.
    pub fn encode_metrics(&self) -> Result<String, TelemetryError> {
        self.utilities.telemetry().encode_metrics()
    }

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================

    /// Spawn the health watcher, compliance scanner and orphan purge.
    ///
    /// Calling it again while the tasks run is a no-op.
    pub fn spawn_background_tasks(&self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            return;
        }

        tasks.push(spawn_health_watcher(
            self.container.clone(),
            self.shutdown_tx.subscribe(),
        ));

        let source: Arc<dyn CorpusSource> = self.registry.clone();
        tasks.push(spawn_scanner(
            Arc::clone(&self.compliance),
            source,
            &self.bus,
            self.shutdown_tx.subscribe(),
        ));

        tasks.push(spawn_orphan_purge(
            Arc::clone(&self.registry),
            self.config.registry.orphan_grace,
            self.shutdown_tx.subscribe(),
        ));

        log_event!(info, COMPONENT, "[Kernel] Background tasks started", tasks = tasks.len());
    }

    /// Number of background tasks still running.
    #[must_use]
    pub fn running_tasks(&self) -> usize {
        self.tasks.lock().iter().filter(|t| !t.is_finished()).count()
    }

    /// Stop background tasks, then stop every service in reverse dependency order.
    ///
    /// Returns the services that were stopped.
    pub async fn shutdown(&self) -> Vec<String> {
        log_event!(info, COMPONENT, "[Kernel] Initiating shutdown");
        self.shutdown_tx.send_replace(true);

        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        let grace = self.config.lifecycle.stop_timeout;
        for task in tasks {
            match tokio::time::timeout(grace, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log_event!(error, COMPONENT, "[Kernel] Background task failed", error = %e),
                Err(_) => log_event!(warn, COMPONENT, "[Kernel] Background task did not stop in time"),
            }
        }

        let stopped = self.container.stop_all().await;
        log_event!(info, COMPONENT, "[Kernel] Shutdown complete", stopped = stopped.len());
        stopped
    }
}

fn spawn_orphan_purge(
    registry: Arc<KernelRegistry>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = registry.purge_expired();
                    if !purged.is_empty() {
                        log_event!(info, COMPONENT, "[Kernel] Purged orphaned capabilities", count = purged.len());
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
