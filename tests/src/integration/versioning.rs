//! # Overwrite Policy
//!
//! Higher or equal versions overwrite. Lower versions are rejected with
//! `StaleVersion` or ignored, per `registry.downgrade_policy`.

#[cfg(test)]
mod tests {
    use ck_03_capability_registry::{DowngradePolicy, RegistrationOutcome, RegistryApi};
    use ck_05_compliance_engine::{ComplianceApi, ViolationFilter};
    use shared_bus::{EventFilter, EventTopic, KernelEvent};
    use shared_types::{CallerContext, KernelError, RuleId};

    use crate::fixtures::{capability, kernel, kernel_with, start_service, CallLog};

    #[tokio::test]
    async fn test_downgrade_rejected_under_default_policy() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let system = CallerContext::system();
        let registry = kernel.registry();

        registry
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "2.0.0"),
                &system,
            )
            .unwrap();
        let err = registry
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.9.9"),
                &system,
            )
            .unwrap_err();

        assert_eq!(
            err,
            KernelError::StaleVersion {
                key: "content/parse_file".into(),
                current: "2.0.0".into(),
                attempted: "1.9.9".into(),
            }
        );
        assert_eq!(
            registry
                .discover_by_capability_name("content", "parse_file")
                .map(|d| d.version),
            Some("2.0.0".to_string())
        );
        assert_eq!(
            kernel
                .utilities()
                .telemetry()
                .metrics()
                .capability_registrations
                .with_label_values(&["rejected"])
                .get(),
            1.0
        );
    }

    #[tokio::test]
    async fn test_downgrade_ignored_under_ignore_policy() {
        let kernel = kernel_with(|c| c.registry.downgrade_policy = DowngradePolicy::Ignore);
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let system = CallerContext::system();
        let registry = kernel.registry();

        registry
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "2.0.0"),
                &system,
            )
            .unwrap();

        let mut events = kernel.subscribe(EventFilter::topics(vec![EventTopic::Capability]));
        let outcome = registry
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &system,
            )
            .unwrap();

        assert_eq!(
            outcome,
            RegistrationOutcome::Ignored {
                current: "2.0.0".into()
            }
        );
        assert_eq!(
            registry
                .discover_by_capability_name("content", "parse_file")
                .map(|d| d.version),
            Some("2.0.0".to_string())
        );
        // An ignored downgrade changes nothing, so nothing is announced.
        assert!(matches!(events.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_reregistering_identical_definition_is_idempotent() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let system = CallerContext::system();
        let definition = capability("content", "parse_file", "content_service", "1.0.0");

        let first = kernel
            .registry()
            .register_domain_capability(definition.clone(), &system)
            .unwrap();
        let second = kernel
            .registry()
            .register_domain_capability(definition, &system)
            .unwrap();

        assert_eq!(first, RegistrationOutcome::Inserted);
        assert_eq!(
            second,
            RegistrationOutcome::Superseded {
                previous: "1.0.0".into()
            }
        );
        assert_eq!(kernel.registry().list_capabilities().len(), 1);
        assert!(kernel
            .compliance()
            .get_violations(&ViolationFilter::all().rule(RuleId::UnbumpedVersion))
            .is_empty());
    }

    #[tokio::test]
    async fn test_changed_content_without_bump_is_flagged() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let system = CallerContext::system();

        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &system,
            )
            .unwrap();
        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0")
                    .with_description("now also parses archives"),
                &system,
            )
            .unwrap();

        let stored = kernel
            .registry()
            .discover_by_capability_name("content", "parse_file")
            .unwrap();
        assert_eq!(stored.description, "now also parses archives");

        let unbumped = kernel
            .compliance()
            .get_violations(&ViolationFilter::all().rule(RuleId::UnbumpedVersion));
        assert_eq!(unbumped.len(), 1);
        assert_eq!(unbumped[0].target, "content/parse_file");
    }

    #[tokio::test]
    async fn test_upgrade_event_carries_previous_version() {
        let kernel = kernel();
        start_service(&kernel, "content_service", &CallLog::default()).await;
        let system = CallerContext::system();
        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &system,
            )
            .unwrap();

        let mut events = kernel.subscribe(EventFilter::topics(vec![EventTopic::Capability]));
        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.1.0"),
                &system,
            )
            .unwrap();

        match events.try_recv() {
            Ok(Some(KernelEvent::CapabilityRegistered {
                version,
                previous_version,
                ..
            })) => {
                assert_eq!(version, "1.1.0");
                assert_eq!(previous_version.as_deref(), Some("1.0.0"));
            }
            other => panic!("expected CapabilityRegistered, got {other:?}"),
        }
    }
}
