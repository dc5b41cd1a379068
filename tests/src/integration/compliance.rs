//! # Compliance Across Components
//!
//! The background scanner watches capability and lifecycle events and
//! rescans the live corpus; operators read and clear the results.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ck_03_capability_registry::RegistryApi;
    use ck_05_compliance_engine::{ComplianceApi, ViolationFilter};
    use shared_bus::{EventFilter, EventTopic, KernelEvent};
    use shared_types::{CallerContext, RuleId, Severity};

    use crate::fixtures::{capability, eventually, kernel, start_service, CallLog};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_scanner_flags_capabilities_of_stopped_owner() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &CallerContext::system(),
            )
            .unwrap();
        kernel.spawn_background_tasks();

        kernel.container().stop("content_service").await.unwrap();

        let compliance = kernel.compliance().clone();
        let orphans = ViolationFilter::all().rule(RuleId::OrphanedCapability);
        assert!(
            eventually(Duration::from_secs(3), || !compliance
                .get_violations(&orphans)
                .is_empty())
            .await,
            "scanner never reported the orphan"
        );
        let found = compliance.get_violations(&orphans);
        assert_eq!(found[0].target, "content/parse_file");
        assert_eq!(found[0].severity, Severity::Warning);

        kernel.shutdown().await;
    }

    #[tokio::test]
    async fn test_nonstandard_realm_is_accepted_with_warning() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let mut findings = kernel.subscribe(EventFilter::topics(vec![EventTopic::Compliance]));

        kernel
            .registry()
            .register_domain_capability(
                capability("labs", "experiment", "content_service", "1.0.0"),
                &CallerContext::system(),
            )
            .unwrap();

        assert!(kernel
            .registry()
            .discover_by_capability_name("labs", "experiment")
            .is_some());
        match findings.try_recv() {
            Ok(Some(KernelEvent::ComplianceFindingRaised(finding))) => {
                assert_eq!(finding.rule, RuleId::NonStandardRealm);
                assert!(!finding.is_blocking());
            }
            other => panic!("expected a NonStandardRealm finding, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_republished_key_after_deregister_is_not_drift() {
        let kernel = kernel();
        let system = CallerContext::system();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let mut original = capability("content", "parse_file", "content_service", "1.0.0");
        original.protocol_name = "FileParser".into();
        kernel
            .registry()
            .register_domain_capability(original, &system)
            .unwrap();

        kernel.deregister("content_service").unwrap();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let mut replacement = capability("content", "parse_file", "content_service", "1.0.0");
        replacement.protocol_name = "DocumentParserV2".into();
        kernel
            .registry()
            .register_domain_capability(replacement, &system)
            .unwrap();

        kernel.scan_now();
        assert_eq!(kernel.registry().list_capabilities().len(), 1);
        assert!(kernel
            .compliance()
            .get_violations(&ViolationFilter::all().rule(RuleId::ProtocolDrift))
            .is_empty());
    }

    #[tokio::test]
    async fn test_protocol_change_on_live_key_is_drift() {
        let kernel = kernel();
        let system = CallerContext::system();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        for (protocol, version) in [("FileParser", "1.0.0"), ("DocumentParserV2", "1.1.0")] {
            let mut definition = capability("content", "parse_file", "content_service", version);
            definition.protocol_name = protocol.into();
            kernel
                .registry()
                .register_domain_capability(definition, &system)
                .unwrap();
        }

        kernel.scan_now();
        let drift = kernel
            .compliance()
            .get_violations(&ViolationFilter::all().rule(RuleId::ProtocolDrift));
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].target, "content/parse_file");
    }

    #[tokio::test]
    async fn test_summary_and_clear() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let system = CallerContext::system();

        let broken = capability("content", "parse_file", "content_service", "not-semver");
        assert!(kernel
            .registry()
            .register_domain_capability(broken, &system)
            .is_err());
        kernel
            .registry()
            .register_domain_capability(
                capability("labs", "experiment", "content_service", "1.0.0"),
                &system,
            )
            .unwrap();

        let summary = kernel.compliance().get_violation_summary();
        assert!(summary.total >= 2);
        assert!(summary.errors() >= 1);
        assert!(summary.warnings() >= 1);
        assert!(summary.last_updated.is_some());

        let cleared = kernel
            .compliance()
            .clear_violations(Some(RuleId::NonStandardRealm));
        assert_eq!(cleared, 1);
        assert!(kernel
            .compliance()
            .get_violations(&ViolationFilter::all().rule(RuleId::NonStandardRealm))
            .is_empty());

        kernel.compliance().clear_violations(None);
        assert_eq!(kernel.compliance().get_violation_summary().total, 0);
    }

    #[tokio::test]
    async fn test_findings_are_counted_in_metrics() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        kernel
            .registry()
            .register_domain_capability(
                capability("labs", "experiment", "content_service", "1.0.0"),
                &CallerContext::system(),
            )
            .unwrap();

        let text = kernel.encode_metrics().unwrap();
        assert!(text.contains("ck_compliance_findings_total"));
        assert!(text.contains("ck_registry_capability_registrations_total"));
    }
}
