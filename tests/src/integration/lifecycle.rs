//! # Lifecycle Across Components
//!
//! Health transitions driven by the watcher, start failure propagation,
//! deregistration and the discovery side effects of each.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ck_03_capability_registry::RegistryApi;
    use ck_04_route_index::RouteQuery;
    use ck_05_compliance_engine::{ComplianceApi, ViolationFilter};
    use shared_bus::{EventFilter, EventTopic, KernelEvent};
    use shared_types::{
        CallerContext, HealthStatus, KernelError, LifecycleState, OverallHealth, RuleId,
        TenantScope,
    };

    use crate::fixtures::{capability, eventually, kernel, start_service, CallLog, RecordingService};

    const WAIT: Duration = Duration::from_secs(3);

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_watcher_degrades_recovers_and_fails_service() {
        let kernel = kernel();
        let service = start_service(&kernel, "content_service", &CallLog::default()).await;
        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &CallerContext::system(),
            )
            .unwrap();
        kernel.spawn_background_tasks();
        let container = kernel.container().clone();

        service.set_health(HealthStatus::Degraded("queue backlog".into()));
        assert!(
            eventually(WAIT, || container.state_of("content_service")
                == Some(LifecycleState::Degraded))
            .await
        );
        // Degraded owners stay discoverable.
        assert_eq!(kernel.registry().discover_routes(&RouteQuery::all()).len(), 1);
        assert_eq!(kernel.get_health().overall, OverallHealth::Degraded);

        service.set_health(HealthStatus::Healthy);
        assert!(
            eventually(WAIT, || container.state_of("content_service")
                == Some(LifecycleState::Started))
            .await
        );

        service.set_health(HealthStatus::Unhealthy("disk gone".into()));
        assert!(
            eventually(WAIT, || container.state_of("content_service")
                == Some(LifecycleState::Failed))
            .await
        );
        assert!(kernel.registry().discover_routes(&RouteQuery::all()).is_empty());
        assert!(kernel
            .registry()
            .discover_by_capability_name("content", "parse_file")
            .is_none());

        kernel.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_dependency_skips_dependents() {
        let kernel = kernel();
        let log = CallLog::default();
        let container = kernel.container();
        container
            .register_service(
                "storage",
                RecordingService::failing("storage", &log, "volume not mounted"),
                vec![],
                TenantScope::Global,
            )
            .unwrap();
        container
            .register_service(
                "content_service",
                RecordingService::new("content_service", &log),
                vec!["storage".into()],
                TenantScope::Global,
            )
            .unwrap();
        container
            .register_service("journey_service", RecordingService::new("journey_service", &log), vec![], TenantScope::Global)
            .unwrap();

        let err = container.start_all().await.unwrap_err();
        let KernelError::StartAllFailed {
            first_failure,
            reason,
            report,
        } = err
        else {
            panic!("expected StartAllFailed, got {err:?}");
        };

        assert_eq!(first_failure, "storage");
        assert!(reason.contains("volume not mounted"));
        assert_eq!(report.started, vec!["journey_service"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "content_service");
        assert_eq!(container.state_of("storage"), Some(LifecycleState::Failed));
        assert_eq!(
            container.state_of("content_service"),
            Some(LifecycleState::Registered)
        );
        assert!(log.position("init:content_service").is_none());
        assert!(kernel.utilities().error_handler().count_for("storage") >= 1);
    }

    #[tokio::test]
    async fn test_start_fails_fast_on_failed_dependency() {
        let kernel = kernel();
        let log = CallLog::default();
        let container = kernel.container();
        container
            .register_service("storage", RecordingService::failing("storage", &log, "boom"), vec![], TenantScope::Global)
            .unwrap();
        assert!(container.start("storage").await.is_err());

        container
            .register_service(
                "content_service",
                RecordingService::new("content_service", &log),
                vec!["storage".into()],
                TenantScope::Global,
            )
            .unwrap();
        let err = tokio::time::timeout(Duration::from_millis(500), container.start("content_service"))
            .await
            .expect("must not wait for a failed dependency")
            .unwrap_err();
        assert!(matches!(
            err,
            KernelError::DependencyNotReady { ref pending, .. } if pending == &vec!["storage".to_string()]
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_failed_service_can_register_again() {
        let kernel = kernel();
        let log = CallLog::default();
        let container = kernel.container();
        container
            .register_service("storage", RecordingService::failing("storage", &log, "boom"), vec![], TenantScope::Global)
            .unwrap();
        assert!(container.start("storage").await.is_err());

        // Terminal entries do not block a fresh registration.
        container
            .register_service("storage", RecordingService::new("storage", &log), vec![], TenantScope::Global)
            .unwrap();
        container.start("storage").await.unwrap();
        assert_eq!(container.state_of("storage"), Some(LifecycleState::Started));

        let err = container
            .register_service("storage", RecordingService::new("storage", &log), vec![], TenantScope::Global)
            .unwrap_err();
        assert!(matches!(err, KernelError::DuplicateActiveRegistration { .. }));
    }

    #[tokio::test]
    async fn test_stopping_required_service_raises_finding() {
        let kernel = kernel();
        let log = CallLog::default();
        let container = kernel.container();
        container
            .register_service("storage", RecordingService::new("storage", &log), vec![], TenantScope::Global)
            .unwrap();
        container
            .register_service(
                "content_service",
                RecordingService::new("content_service", &log),
                vec!["storage".into()],
                TenantScope::Global,
            )
            .unwrap();
        container.start_all().await.unwrap();

        container.stop("storage").await.unwrap();

        let findings = kernel
            .compliance()
            .get_violations(&ViolationFilter::all().rule(RuleId::StopWithDependents));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].target, "storage");
        assert!(findings[0].message.contains("content_service"));

        let health = kernel.get_health();
        let content = health.service("content_service").unwrap();
        assert_eq!(content.unhealthy_dependencies, vec!["storage"]);
    }

    #[tokio::test]
    async fn test_shutdown_stops_in_reverse_dependency_order() {
        let kernel = kernel();
        let log = CallLog::default();
        let container = kernel.container();
        container
            .register_service("storage", RecordingService::new("storage", &log), vec![], TenantScope::Global)
            .unwrap();
        container
            .register_service(
                "content_service",
                RecordingService::new("content_service", &log),
                vec!["storage".into()],
                TenantScope::Global,
            )
            .unwrap();
        container.start_all().await.unwrap();

        let stopped = kernel.shutdown().await;
        assert_eq!(stopped, vec!["content_service", "storage"]);
        assert!(log.position("stop:content_service") < log.position("stop:storage"));
        assert!(kernel
            .compliance()
            .get_violations(&ViolationFilter::all().rule(RuleId::StopWithDependents))
            .is_empty());
    }

    #[tokio::test]
    async fn test_lifecycle_events_follow_state_machine() {
        let kernel = kernel();
        let mut events = kernel.subscribe(EventFilter::topics(vec![EventTopic::Lifecycle]));
        start_service(&kernel, "content_service", &CallLog::default()).await;

        let mut seen = Vec::new();
        while let Ok(Some(event)) = events.try_recv() {
            match event {
                KernelEvent::ServiceRegistered { name, .. } => seen.push(format!("registered:{name}")),
                KernelEvent::ServiceStateChanged { to, .. } => seen.push(format!("{to}")),
                _ => {}
            }
        }
        assert_eq!(seen, vec!["registered:content_service", "Initializing", "Started"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unregistered_capability_is_gone_from_discovery_at_once() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let system = CallerContext::system();
        for name in ["parse_file", "extract_text"] {
            kernel
                .registry()
                .register_domain_capability(capability("content", name, "content_service", "1.0.0"), &system)
                .unwrap();
        }
        let mut events = kernel.subscribe(EventFilter::topics(vec![EventTopic::Capability]));

        kernel
            .registry()
            .unregister_capability("content", "parse_file", &system)
            .unwrap();

        let routes = kernel.registry().discover_routes(&RouteQuery::all().realm("content"));
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].capability_name, "extract_text");
        assert!(kernel
            .registry()
            .discover_by_capability_name("content", "parse_file")
            .is_none());
        assert!(matches!(
            events.try_recv(),
            Ok(Some(KernelEvent::CapabilityRemoved { ref service_name, .. })) if service_name == "content_service"
        ));
        // The owner keeps running.
        assert_eq!(
            kernel.container().state_of("content_service"),
            Some(LifecycleState::Started)
        );
    }

    #[tokio::test]
    async fn test_deregister_through_kernel_hides_routes() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &CallerContext::system(),
            )
            .unwrap();

        let outcome = kernel.deregister("content_service").unwrap();
        assert_eq!(outcome.removed_capabilities.len(), 1);
        assert!(kernel.registry().discover_routes(&RouteQuery::all()).is_empty());
        assert!(kernel.registry().is_empty());
        assert!(kernel.container().state_of("content_service").is_none());
    }
}
