//! Lifecycle Container service.

use std::collections::{BTreeSet, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ck_01_utility_bootstrap::Utilities;
use futures::future::join_all;
use futures::FutureExt;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, KernelEvent};
use shared_types::{
    ComplianceFinding, FindingSink, HealthRecord, HealthReport, HealthStatus, KernelError,
    LifecycleEvent, LifecycleState, RuleId, ServiceHealth, ServiceSnapshot, StartReport,
    TenantScope,
};
use kernel_telemetry::log_service_event;
use tokio::sync::watch;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::domain::{start_waves, topological_order, DependencyGraph, LifecycleConfig, ServiceError};
use crate::ports::{LifecycleApi, ServiceInstance};

const COMPONENT: &str = "lifecycle-container";

struct ServiceEntry {
    instance: Arc<dyn ServiceInstance>,
    dependencies: Vec<String>,
    tenant_scope: TenantScope,
    state: LifecycleState,
    state_changed_at: DateTime<Utc>,
    last_health: Option<HealthRecord>,
    last_error: Option<String>,
    /// Distinguishes successive registrations under the same name.
    generation: u64,
    /// Set while a `stop` call is running `shutdown`.
    stopping: bool,
}

impl ServiceEntry {
    fn snapshot(&self, name: &str) -> ServiceSnapshot {
        ServiceSnapshot {
            name: name.to_string(),
            state: self.state,
            state_changed_at: self.state_changed_at,
            dependencies: self.dependencies.clone(),
            tenant_scope: self.tenant_scope.clone(),
            last_health: self.last_health.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

type ServiceTable = HashMap<String, ServiceEntry>;

/// A state change applied under the table lock, announced after release.
struct Transition {
    name: String,
    from: LifecycleState,
    to: LifecycleState,
    at: DateTime<Utc>,
}

enum Readiness {
    Ready,
    /// Dependencies not running yet, or not registered yet.
    Waiting(Vec<String>),
    /// Dependencies that will never run without intervention.
    Blocked(Vec<String>),
}

struct Inner {
    services: RwLock<ServiceTable>,
    utilities: Arc<Utilities>,
    config: LifecycleConfig,
    /// Bumped on every table change; `start` waits on it.
    state_version: watch::Sender<u64>,
    next_generation: AtomicU64,
}

/// Owns every service registration and drives the lifecycle state machine.
///
/// Cheap to clone. Clones share the same service table.
#[derive(Clone)]
pub struct LifecycleContainer {
    inner: Arc<Inner>,
    publisher: Option<Arc<dyn EventPublisher>>,
    findings: Option<Arc<dyn FindingSink>>,
}

impl LifecycleContainer {
    /// Holding a [`Utilities`] value proves bootstrap completed.
    #[must_use]
    pub fn new(utilities: Arc<Utilities>, config: LifecycleConfig) -> Self {
        let (state_version, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                services: RwLock::new(HashMap::new()),
                utilities,
                config,
                state_version,
                next_generation: AtomicU64::new(1),
            }),
            publisher: None,
            findings: None,
        }
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Where stop-with-dependents warnings go.
    #[must_use]
    pub fn with_finding_sink(mut self, sink: Arc<dyn FindingSink>) -> Self {
        self.findings = Some(sink);
        self
    }

    #[must_use]
    pub fn config(&self) -> &LifecycleConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn utilities(&self) -> &Arc<Utilities> {
        &self.inner.utilities
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    pub fn register_service(
        &self,
        name: &str,
        instance: Arc<dyn ServiceInstance>,
        dependencies: Vec<String>,
        tenant_scope: TenantScope,
    ) -> Result<(), KernelError> {
        if name.trim().is_empty() {
            return Err(invalid_registration(name, "service name is blank"));
        }
        if dependencies.iter().any(|d| d.trim().is_empty()) {
            return Err(invalid_registration(name, "dependency name is blank"));
        }
        if dependencies.iter().any(|d| d == name) {
            return Err(KernelError::CyclicDependency {
                cycles: vec![vec![name.to_string()]],
            });
        }

        let mut seen = BTreeSet::new();
        let dependencies: Vec<String> = dependencies
            .into_iter()
            .filter(|d| seen.insert(d.clone()))
            .collect();

        {
            let mut services = self.inner.services.write();
            if let Some(existing) = services.get(name) {
                if !existing.state.is_terminal() {
                    return Err(KernelError::DuplicateActiveRegistration {
                        name: name.to_string(),
                        state: existing.state,
                    });
                }
            }
            services.insert(
                name.to_string(),
                ServiceEntry {
                    instance,
                    dependencies: dependencies.clone(),
                    tenant_scope: tenant_scope.clone(),
                    state: LifecycleState::Registered,
                    state_changed_at: Utc::now(),
                    last_health: None,
                    last_error: None,
                    generation: self.inner.next_generation.fetch_add(1, Ordering::Relaxed),
                    stopping: false,
                },
            );
        }

        info!(
            service = name,
            dependencies = ?dependencies,
            tenant_scope = %tenant_scope,
            "[Container] Registered service"
        );
        self.publish(KernelEvent::ServiceRegistered {
            name: name.to_string(),
            dependencies,
            tenant_scope,
        });
        self.bump();
        Ok(())
    }

    /// Remove a registration. Rejected while the service is initializing.
    pub fn deregister(&self, name: &str) -> Result<ServiceSnapshot, KernelError> {
        let snapshot = {
            let mut services = self.inner.services.write();
            let entry = services.get(name).ok_or_else(|| not_found(name))?;
            entry
                .state
                .transition(LifecycleEvent::Deregister)
                .map_err(|e| invalid_transition(name, e.from, e.event))?;
            let snapshot = entry.snapshot(name);
            services.remove(name);
            snapshot
        };

        if snapshot.state.is_running() {
            warn!(service = name, state = %snapshot.state, "[Container] Deregistered a running service");
        } else {
            info!(service = name, "[Container] Deregistered service");
        }
        self.publish(KernelEvent::ServiceDeregistered {
            name: name.to_string(),
        });
        self.bump();
        Ok(snapshot)
    }

    // =========================================================================
    // START
    // =========================================================================

    /// Start one service.
    ///
    /// Waits up to `start_timeout` for dependencies to be running, then runs
    /// `initialize` on its own task, bounded by `start_timeout` again.
    pub async fn start(&self, name: &str) -> Result<(), KernelError> {
        let mut versions = self.inner.state_version.subscribe();
        let deadline = Instant::now() + self.inner.config.start_timeout;

        loop {
            versions.borrow_and_update();
            match self.readiness(name)? {
                Readiness::Ready => break,
                Readiness::Blocked(blocked) => {
                    warn!(service = name, blocked = ?blocked, "[Container] Dependencies will not start");
                    return Err(KernelError::DependencyNotReady {
                        name: name.to_string(),
                        pending: blocked,
                    });
                }
                Readiness::Waiting(pending) => {
                    debug!(service = name, pending = ?pending, "[Container] Waiting on dependencies");
                    if !matches!(timeout_at(deadline, versions.changed()).await, Ok(Ok(()))) {
                        return Err(KernelError::DependencyNotReady {
                            name: name.to_string(),
                            pending,
                        });
                    }
                }
            }
        }

        self.initialize(name).await
    }

    fn readiness(&self, name: &str) -> Result<Readiness, KernelError> {
        let services = self.inner.services.read();
        let entry = services.get(name).ok_or_else(|| not_found(name))?;
        if entry.state != LifecycleState::Registered {
            return Err(invalid_transition(
                name,
                entry.state,
                LifecycleEvent::BeginInit,
            ));
        }

        let mut waiting = Vec::new();
        let mut blocked = Vec::new();
        for dep in &entry.dependencies {
            match services.get(dep.as_str()).map(|e| e.state) {
                Some(state) if state.satisfies_dependency() => {}
                Some(state) if state.is_terminal() => blocked.push(dep.clone()),
                _ => waiting.push(dep.clone()),
            }
        }

        Ok(if !blocked.is_empty() {
            Readiness::Blocked(blocked)
        } else if !waiting.is_empty() {
            Readiness::Waiting(waiting)
        } else {
            Readiness::Ready
        })
    }

    async fn initialize(&self, name: &str) -> Result<(), KernelError> {
        let (instance, generation, transition) = {
            let mut services = self.inner.services.write();
            let dependencies = services
                .get(name)
                .map(|e| e.dependencies.clone())
                .ok_or_else(|| not_found(name))?;
            // A dependency may have failed between the readiness check and now.
            let unmet = unmet_dependencies(&services, &dependencies);
            if !unmet.is_empty() {
                return Err(KernelError::DependencyNotReady {
                    name: name.to_string(),
                    pending: unmet,
                });
            }
            let transition = apply_locked(&mut services, name, LifecycleEvent::BeginInit, None, None)?;
            let entry = services.get(name).ok_or_else(|| not_found(name))?;
            (Arc::clone(&entry.instance), entry.generation, transition)
        };
        self.announce(transition);

        let container = self.clone();
        let owned = name.to_string();
        let task = tokio::spawn(async move {
            let timer = container
                .inner
                .utilities
                .telemetry()
                .start_operation(&owned, "initialize");
            let outcome = AssertUnwindSafe(instance.initialize())
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(ServiceError::new("initialization panicked")));
            let elapsed = timer.elapsed();
            if outcome.is_ok() {
                timer.succeed();
            }
            container.finish_init(&owned, generation, outcome, elapsed)
        });

        match timeout(self.inner.config.start_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(KernelError::StartFailed {
                name: name.to_string(),
                reason: join_error.to_string(),
            }),
            Err(_) => {
                warn!(
                    service = name,
                    timeout_ms = self.inner.config.start_timeout.as_millis() as u64,
                    "[Container] Initialization still running after timeout"
                );
                self.inner.utilities.error_handler().record(
                    name,
                    "start_timed_out",
                    "initialization did not finish within the start timeout",
                );
                Err(KernelError::StartTimedOut {
                    name: name.to_string(),
                })
            }
        }
    }

    fn finish_init(
        &self,
        name: &str,
        generation: u64,
        outcome: Result<(), ServiceError>,
        elapsed: std::time::Duration,
    ) -> Result<(), KernelError> {
        match outcome {
            Ok(()) => {
                let transition =
                    self.apply(name, LifecycleEvent::InitSucceeded, Some(generation), None)
                        .map_err(|e| KernelError::StartFailed {
                            name: name.to_string(),
                            reason: format!("registration changed during initialization: {e}"),
                        })?;
                self.announce(transition);
                log_service_event!(
                    info,
                    COMPONENT,
                    name,
                    "[Container] Service started",
                    elapsed_ms = elapsed.as_millis() as u64
                );
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                self.inner
                    .utilities
                    .error_handler()
                    .record(name, "start_failed", &reason);
                match self.apply(
                    name,
                    LifecycleEvent::InitFailed,
                    Some(generation),
                    Some(reason.clone()),
                ) {
                    Ok(transition) => self.announce(transition),
                    Err(stale) => debug!(service = name, error = %stale, "[Container] Dropped stale init result"),
                }
                Err(KernelError::StartFailed {
                    name: name.to_string(),
                    reason,
                })
            }
        }
    }

    /// Start every registered service in dependency order.
    ///
    /// Services in the same wave start concurrently. A failure skips its
    /// dependents but not independent branches.
    pub async fn start_all(&self) -> Result<StartReport, KernelError> {
        let graph = self.dependency_graph();
        let order = topological_order(&graph)
            .map_err(|cycles| KernelError::CyclicDependency { cycles })?;
        let waves = start_waves(&graph, &order);

        info!(services = order.len(), waves = waves.len(), "[Container] Starting all services");

        let mut report = StartReport::default();
        let mut unusable: BTreeSet<String> = BTreeSet::new();

        for wave in waves {
            let mut batch = Vec::new();
            for name in wave {
                let Some(snapshot) = self.service_snapshot(&name) else {
                    continue;
                };
                match snapshot.state {
                    LifecycleState::Registered => {}
                    // Started elsewhere; dependents wait on it in `start`.
                    LifecycleState::Initializing => continue,
                    state if state.is_running() => continue,
                    state => {
                        report.skipped.push((name.clone(), format!("service is {state}")));
                        unusable.insert(name);
                        continue;
                    }
                }

                let blocker = snapshot.dependencies.iter().find_map(|dep| {
                    if unusable.contains(dep) {
                        Some(format!("dependency '{dep}' did not start"))
                    } else if !graph.contains_key(dep) {
                        Some(format!("dependency '{dep}' is not registered"))
                    } else {
                        None
                    }
                });
                if let Some(reason) = blocker {
                    warn!(service = %name, reason = %reason, "[Container] Skipping service");
                    report.skipped.push((name.clone(), reason));
                    unusable.insert(name);
                    continue;
                }
                batch.push(name);
            }

            let results = join_all(batch.iter().map(|name| self.start(name))).await;
            for (name, result) in batch.into_iter().zip(results) {
                match result {
                    Ok(()) => report.started.push(name),
                    Err(e) => {
                        report.failed.push((name.clone(), e.to_string()));
                        unusable.insert(name);
                    }
                }
            }
        }

        if let Some((first_failure, reason)) = report.failed.first().cloned() {
            error!(
                first_failure = %first_failure,
                failed = report.failed.len(),
                started = report.started.len(),
                "[Container] start_all finished with failures"
            );
            return Err(KernelError::StartAllFailed {
                first_failure,
                reason,
                report,
            });
        }

        info!(
            started = report.started.len(),
            skipped = report.skipped.len(),
            "[Container] start_all complete"
        );
        Ok(report)
    }

    // =========================================================================
    // STOP
    // =========================================================================

    /// Stop one service. Dependents still running raise a warning finding.
    ///
    /// Only one caller runs `shutdown` for a registration; a concurrent call
    /// gets `StopInProgress`.
    pub async fn stop(&self, name: &str) -> Result<(), KernelError> {
        let (instance, generation, dependents) = {
            let mut services = self.inner.services.write();
            let dependents = running_dependents(&services, name);
            let entry = services.get_mut(name).ok_or_else(|| not_found(name))?;
            entry
                .state
                .transition(LifecycleEvent::Stop)
                .map_err(|e| invalid_transition(name, e.from, e.event))?;
            if entry.stopping {
                return Err(KernelError::StopInProgress {
                    name: name.to_string(),
                });
            }
            entry.stopping = true;
            (Arc::clone(&entry.instance), entry.generation, dependents)
        };

        if !dependents.is_empty() {
            warn!(service = name, dependents = ?dependents, "[Container] Stopping a service that others depend on");
            self.raise(ComplianceFinding::warning(
                RuleId::StopWithDependents,
                name,
                format!("stopped while still required by: {}", dependents.join(", ")),
            ));
        }

        let stop_timeout = self.inner.config.stop_timeout;
        let timer = self.inner.utilities.telemetry().start_operation(name, "shutdown");
        let outcome = match timeout(stop_timeout, AssertUnwindSafe(instance.shutdown()).catch_unwind()).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ServiceError::new("shutdown panicked")),
            Err(_) => Err(ServiceError::new(format!(
                "shutdown did not finish within {}ms",
                stop_timeout.as_millis()
            ))),
        };
        if outcome.is_ok() {
            timer.succeed();
        } else {
            drop(timer);
        }

        let shutdown_error = outcome.err().map(|e| {
            let reason = e.to_string();
            warn!(service = name, error = %reason, "[Container] Shutdown reported an error");
            self.inner
                .utilities
                .error_handler()
                .record(name, "shutdown_failed", &reason);
            reason
        });

        let transition = self
            .apply(name, LifecycleEvent::Stop, Some(generation), shutdown_error)
            .inspect_err(|e| {
                debug!(service = name, error = %e, "[Container] Registration changed during shutdown");
            })?;
        self.announce(transition);
        info!(service = name, "[Container] Service stopped");
        Ok(())
    }

    /// Stop every stoppable service, dependents before their dependencies.
    pub async fn stop_all(&self) -> Vec<String> {
        let graph = self.dependency_graph();
        let order = topological_order(&graph).unwrap_or_else(|_| graph.keys().cloned().collect());

        let mut stopped = Vec::new();
        for name in order.into_iter().rev() {
            let stoppable = self
                .state_of(&name)
                .is_some_and(|state| state.transition(LifecycleEvent::Stop).is_ok());
            if !stoppable {
                continue;
            }
            match self.stop(&name).await {
                Ok(()) => stopped.push(name),
                Err(e) => warn!(service = %name, error = %e, "[Container] Could not stop service"),
            }
        }

        info!(stopped = stopped.len(), "[Container] stop_all complete");
        stopped
    }

    // =========================================================================
    // HEALTH
    // =========================================================================

    pub fn get_health(&self) -> HealthReport {
        let entries: Vec<ServiceHealth> = {
            let services = self.inner.services.read();
            services
                .iter()
                .map(|(name, entry)| ServiceHealth {
                    name: name.clone(),
                    state: entry.state,
                    last_health: entry.last_health.clone(),
                    unhealthy_dependencies: entry
                        .dependencies
                        .iter()
                        .filter(|d| {
                            !services
                                .get(d.as_str())
                                .is_some_and(|dep| dep.state.is_running())
                        })
                        .cloned()
                        .collect(),
                })
                .collect()
        };

        let telemetry = self.inner.utilities.telemetry();
        for entry in &entries {
            let up = if entry.state.is_running() { 1.0 } else { 0.0 };
            telemetry.record_health_metric(&entry.name, "up", up);
        }
        self.inner.utilities.health().aggregate(entries)
    }

    /// Check every running service once. Returns the number of state changes.
    pub async fn check_health_once(&self) -> usize {
        let targets: Vec<(String, u64, Arc<dyn ServiceInstance>)> = {
            let services = self.inner.services.read();
            services
                .iter()
                .filter(|(_, e)| e.state.is_running())
                .map(|(name, e)| (name.clone(), e.generation, Arc::clone(&e.instance)))
                .collect()
        };

        let check_timeout = self.inner.config.health_check_interval;
        let checks = targets.into_iter().map(|(name, generation, instance)| async move {
            let status = match timeout(check_timeout, AssertUnwindSafe(instance.health_check()).catch_unwind()).await {
                Ok(Ok(status)) => status,
                Ok(Err(_)) => HealthStatus::Unhealthy("health check panicked".to_string()),
                Err(_) => HealthStatus::Degraded("health check timed out".to_string()),
            };
            (name, generation, status)
        });

        let mut changed = 0;
        for (name, generation, status) in join_all(checks).await {
            if self.record_health(&name, generation, status) {
                changed += 1;
            }
        }
        changed
    }

    fn record_health(&self, name: &str, generation: u64, status: HealthStatus) -> bool {
        let transition = {
            let mut services = self.inner.services.write();
            let Some(entry) = services.get_mut(name) else {
                return false;
            };
            if entry.generation != generation {
                return false;
            }
            entry.last_health = Some(HealthRecord::now(status.clone()));

            let (event, reason) = match (&status, entry.state) {
                (HealthStatus::Healthy, LifecycleState::Degraded) => {
                    (LifecycleEvent::HealthRecovered, None)
                }
                (HealthStatus::Degraded(reason), LifecycleState::Started) => {
                    (LifecycleEvent::HealthDegraded, Some(reason.clone()))
                }
                (HealthStatus::Unhealthy(reason), state) if state.is_running() => {
                    (LifecycleEvent::HealthFailed, Some(reason.clone()))
                }
                _ => return false,
            };
            match apply_locked(&mut services, name, event, Some(generation), reason) {
                Ok(transition) => transition,
                Err(_) => return false,
            }
        };

        match &status {
            HealthStatus::Unhealthy(reason) => {
                self.inner
                    .utilities
                    .error_handler()
                    .record(name, "health_failed", reason);
            }
            HealthStatus::Degraded(reason) => {
                log_service_event!(warn, COMPONENT, name, "[Container] Service degraded", reason = %reason);
            }
            HealthStatus::Healthy => {
                log_service_event!(info, COMPONENT, name, "[Container] Service recovered");
            }
        }
        self.announce(transition);
        true
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Current dependency graph of every registration.
    #[must_use]
    pub fn dependency_graph(&self) -> DependencyGraph {
        self.inner
            .services
            .read()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.dependencies.clone()))
            .collect()
    }

    /// The order `start_all` would use.
    pub fn topological_order(&self) -> Result<Vec<String>, KernelError> {
        topological_order(&self.dependency_graph())
            .map_err(|cycles| KernelError::CyclicDependency { cycles })
    }

    #[must_use]
    pub fn state_of(&self, name: &str) -> Option<LifecycleState> {
        self.inner.services.read().get(name).map(|e| e.state)
    }

    #[must_use]
    pub fn service_snapshot(&self, name: &str) -> Option<ServiceSnapshot> {
        self.inner
            .services
            .read()
            .get(name)
            .map(|entry| entry.snapshot(name))
    }

    /// Every registration, sorted by name.
    #[must_use]
    pub fn snapshot_all(&self) -> Vec<ServiceSnapshot> {
        let mut all: Vec<ServiceSnapshot> = self
            .inner
            .services
            .read()
            .iter()
            .map(|(name, entry)| entry.snapshot(name))
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Running services that declare `name` as a dependency.
    #[must_use]
    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        running_dependents(&self.inner.services.read(), name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.services.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn apply(
        &self,
        name: &str,
        event: LifecycleEvent,
        generation: Option<u64>,
        error: Option<String>,
    ) -> Result<Transition, KernelError> {
        apply_locked(&mut self.inner.services.write(), name, event, generation, error)
    }

    fn announce(&self, transition: Transition) {
        if transition.from != transition.to {
            self.inner
                .utilities
                .telemetry()
                .metrics()
                .lifecycle_transitions
                .with_label_values(&[transition.to.to_string().to_lowercase().as_str()])
                .inc();
            debug!(
                service = %transition.name,
                from = %transition.from,
                to = %transition.to,
                "[Container] State changed"
            );
            self.publish(KernelEvent::ServiceStateChanged {
                name: transition.name,
                from: transition.from,
                to: transition.to,
                at: transition.at,
            });
        }
        self.bump();
    }

    fn publish(&self, event: KernelEvent) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(event);
        }
    }

    fn raise(&self, finding: ComplianceFinding) {
        if let Some(sink) = &self.findings {
            sink.raise(finding);
        }
    }

    fn bump(&self) {
        self.inner
            .state_version
            .send_modify(|version| *version = version.wrapping_add(1));
    }
}

fn apply_locked(
    services: &mut ServiceTable,
    name: &str,
    event: LifecycleEvent,
    generation: Option<u64>,
    error: Option<String>,
) -> Result<Transition, KernelError> {
    let entry = services
        .get_mut(name)
        .filter(|e| generation.map_or(true, |g| g == e.generation))
        .ok_or_else(|| not_found(name))?;

    let from = entry.state;
    let to = from
        .transition(event)
        .map_err(|e| invalid_transition(name, e.from, e.event))?;
    let at = Utc::now();
    if to != from {
        entry.state = to;
        entry.state_changed_at = at;
    }
    if error.is_some() {
        entry.last_error = error;
    }

    Ok(Transition {
        name: name.to_string(),
        from,
        to,
        at,
    })
}

fn unmet_dependencies(services: &ServiceTable, dependencies: &[String]) -> Vec<String> {
    dependencies
        .iter()
        .filter(|d| {
            !services
                .get(d.as_str())
                .is_some_and(|e| e.state.satisfies_dependency())
        })
        .cloned()
        .collect()
}

fn running_dependents(services: &ServiceTable, name: &str) -> Vec<String> {
    let mut dependents: Vec<String> = services
        .iter()
        .filter(|(_, e)| e.state.is_running() && e.dependencies.iter().any(|d| d == name))
        .map(|(dependent, _)| dependent.clone())
        .collect();
    dependents.sort();
    dependents
}

fn not_found(name: &str) -> KernelError {
    KernelError::ServiceNotFound {
        name: name.to_string(),
    }
}

fn invalid_transition(name: &str, from: LifecycleState, event: LifecycleEvent) -> KernelError {
    KernelError::InvalidLifecycleTransition {
        name: name.to_string(),
        from,
        event,
    }
}

fn invalid_registration(name: &str, reason: &str) -> KernelError {
    KernelError::InvalidRegistration {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl LifecycleApi for LifecycleContainer {
    fn register_service(
        &self,
        name: &str,
        instance: Arc<dyn ServiceInstance>,
        dependencies: Vec<String>,
        tenant_scope: TenantScope,
    ) -> Result<(), KernelError> {
        LifecycleContainer::register_service(self, name, instance, dependencies, tenant_scope)
    }

    async fn start(&self, name: &str) -> Result<(), KernelError> {
        LifecycleContainer::start(self, name).await
    }

    async fn start_all(&self) -> Result<StartReport, KernelError> {
        LifecycleContainer::start_all(self).await
    }

    async fn stop(&self, name: &str) -> Result<(), KernelError> {
        LifecycleContainer::stop(self, name).await
    }

    async fn stop_all(&self) -> Vec<String> {
        LifecycleContainer::stop_all(self).await
    }

    fn deregister(&self, name: &str) -> Result<ServiceSnapshot, KernelError> {
        LifecycleContainer::deregister(self, name)
    }

    fn get_health(&self) -> HealthReport {
        LifecycleContainer::get_health(self)
    }
}
