//! # Acceptance Scenarios
//!
//! | # | Scenario | Expected |
//! |---|----------|----------|
//! | 1 | `A`, `B(deps=[A])` registered concurrently, `start_all` | A Started strictly before B initializes |
//! | 2 | Capability with no contracts | `StructuralValidationFailed`, nothing stored |
//! | 3 | `parse_file` 1.0.0 then 1.1.0 | lookup returns 1.1.0 |
//! | 4 | `A -> B -> A` | `CyclicDependency` naming both |
//! | 5 | 100 concurrent registrations on distinct keys | all 100 discoverable |

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rand::seq::SliceRandom;
    use tokio::time::timeout;

    use ck_03_capability_registry::RegistryApi;
    use ck_04_route_index::RouteQuery;
    use ck_05_compliance_engine::{ComplianceApi, ViolationFilter};
    use shared_types::{
        CallerContext, CapabilityDefinition, KernelError, LifecycleState, RuleId, TenantScope,
    };

    use crate::fixtures::{capability, kernel, start_service, CallLog, RecordingService};

    // =========================================================================
    // SCENARIO 1: DEPENDENCY-ORDERED START
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_dependency_starts_strictly_before_dependent() {
        let kernel = Arc::new(kernel());
        let log = CallLog::default();

        let register_a = {
            let kernel = Arc::clone(&kernel);
            let service = RecordingService::slow("A", &log, Duration::from_millis(50));
            tokio::spawn(async move {
                kernel
                    .container()
                    .register_service("A", service, vec![], TenantScope::Global)
            })
        };
        let register_b = {
            let kernel = Arc::clone(&kernel);
            let service = RecordingService::new("B", &log);
            tokio::spawn(async move {
                kernel.container().register_service(
                    "B",
                    service,
                    vec!["A".to_string()],
                    TenantScope::Global,
                )
            })
        };
        register_a.await.unwrap().unwrap();
        register_b.await.unwrap().unwrap();

        let report = kernel.container().start_all().await.unwrap();
        assert_eq!(report.started, vec!["A", "B"]);

        let a_ready = log.position("ready:A").expect("A initialized");
        let b_init = log.position("init:B").expect("B initialized");
        assert!(a_ready < b_init, "B began before A was ready: {:?}", log.entries());
        assert_eq!(kernel.container().state_of("B"), Some(LifecycleState::Started));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_start_waits_for_dependency_started_elsewhere() {
        let kernel = Arc::new(kernel());
        let log = CallLog::default();
        kernel
            .container()
            .register_service("B", RecordingService::new("B", &log), vec!["A".into()], TenantScope::Global)
            .unwrap();

        let waiting = {
            let kernel = Arc::clone(&kernel);
            tokio::spawn(async move { kernel.container().start("B").await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(kernel.container().state_of("B"), Some(LifecycleState::Registered));

        start_service(&kernel, "A", &log).await;
        timeout(Duration::from_secs(2), waiting)
            .await
            .expect("B should start once A is up")
            .unwrap()
            .unwrap();
        assert!(log.position("ready:A") < log.position("init:B"));
    }

    // =========================================================================
    // SCENARIO 2: EMPTY CONTRACTS
    // =========================================================================

    #[tokio::test]
    async fn test_empty_contracts_rejected_and_never_observable() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;

        let bare = CapabilityDefinition::new("content", "parse_file", "content_service", "FileParser");
        let err = kernel
            .registry()
            .register_domain_capability(bare, &CallerContext::system())
            .unwrap_err();

        match err {
            KernelError::StructuralValidationFailed { target, findings } => {
                assert_eq!(target, "content/parse_file");
                assert!(findings.iter().any(|f| f.rule == RuleId::EmptyContracts));
            }
            other => panic!("expected StructuralValidationFailed, got {other:?}"),
        }

        assert!(kernel
            .registry()
            .discover_by_capability_name("content", "parse_file")
            .is_none());
        assert!(kernel.registry().discover_routes(&RouteQuery::all()).is_empty());
        assert_eq!(
            kernel
                .compliance()
                .get_violations(&ViolationFilter::all().rule(RuleId::EmptyContracts))
                .len(),
            1
        );
    }

    // =========================================================================
    // SCENARIO 3: VERSION UPGRADE
    // =========================================================================

    #[tokio::test]
    async fn test_upgrade_replaces_visible_version() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let system = CallerContext::system();

        for version in ["1.0.0", "1.1.0"] {
            kernel
                .registry()
                .register_domain_capability(
                    capability("content", "parse_file", "content_service", version),
                    &system,
                )
                .unwrap();
        }

        let found = kernel
            .registry()
            .discover_by_capability_name("content", "parse_file")
            .unwrap();
        assert_eq!(found.version, "1.1.0");

        let routes = kernel
            .registry()
            .discover_routes(&RouteQuery::all().realm("content"));
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].version, "1.1.0");
    }

    // =========================================================================
    // SCENARIO 4: CYCLE DETECTION
    // =========================================================================

    #[tokio::test]
    async fn test_cycle_reported_with_both_members() {
        let kernel = kernel();
        let log = CallLog::default();
        kernel
            .container()
            .register_service("A", RecordingService::new("A", &log), vec!["B".into()], TenantScope::Global)
            .unwrap();
        kernel
            .container()
            .register_service("B", RecordingService::new("B", &log), vec!["A".into()], TenantScope::Global)
            .unwrap();

        let err = kernel.container().start_all().await.unwrap_err();
        let KernelError::CyclicDependency { cycles } = err else {
            panic!("expected CyclicDependency, got {err:?}");
        };
        assert_eq!(cycles.len(), 1);
        let mut members = cycles[0].clone();
        members.sort();
        assert_eq!(members, vec!["A", "B"]);

        // Nothing was initialized.
        assert!(log.entries().is_empty());
        assert_eq!(kernel.container().state_of("A"), Some(LifecycleState::Registered));
    }

    // =========================================================================
    // SCENARIO 5: CONCURRENT REGISTRATION
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_hundred_concurrent_registrations_all_discoverable() {
        let kernel = Arc::new(kernel());
        start_service(&kernel, "content_service", &CallLog::default()).await;

        let mut names: Vec<String> = (0..100).map(|i| format!("capability_{i:03}")).collect();
        names.shuffle(&mut rand::thread_rng());

        let handles: Vec<_> = names
            .iter()
            .cloned()
            .map(|name| {
                let kernel = Arc::clone(&kernel);
                tokio::spawn(async move {
                    kernel.registry().register_domain_capability(
                        capability("content", &name, "content_service", "1.0.0"),
                        &CallerContext::system(),
                    )
                })
            })
            .collect();
        for result in futures::future::join_all(handles).await {
            result.unwrap().unwrap();
        }

        assert_eq!(kernel.registry().list_capabilities().len(), 100);
        assert_eq!(kernel.registry().discover_routes(&RouteQuery::all()).len(), 100);
        for name in &names {
            assert!(
                kernel
                    .registry()
                    .discover_by_capability_name("content", name)
                    .is_some(),
                "{name} missing"
            );
        }
    }

    // =========================================================================
    // NON-BLOCKING DISCOVERY
    // =========================================================================

    #[tokio::test]
    async fn test_discovery_on_no_match_returns_immediately() {
        let kernel = kernel();
        let lookup = async {
            (
                kernel
                    .registry()
                    .discover_by_capability_name("content", "missing"),
                kernel
                    .registry()
                    .discover_routes(&RouteQuery::all().realm("journey")),
            )
        };
        let (single, routes) = timeout(Duration::from_millis(100), lookup)
            .await
            .expect("discovery must not wait for registrations");
        assert!(single.is_none());
        assert!(routes.is_empty());
    }
}
