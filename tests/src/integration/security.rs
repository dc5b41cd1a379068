//! # Authorization and Tenancy
//!
//! With `security.enforce_authorization` on, writes need `capability:write`,
//! `capability:write:<realm>` or the admin role. Tenant callers must belong
//! to a known tenant and publish into their own scope.

#[cfg(test)]
mod tests {
    use ck_03_capability_registry::RegistryApi;
    use ck_04_route_index::RouteQuery;
    use kernel_runtime::Kernel;
    use shared_types::{CallerContext, KernelError, TenantScope};

    use crate::fixtures::{capability, kernel_with, start_service, CallLog};

    async fn secured_kernel() -> Kernel {
        let kernel = kernel_with(|c| {
            c.security.enforce_authorization = true;
            c.security.known_tenants = vec!["acme".to_string(), "globex".to_string()];
        });
        start_service(&kernel, "content_service", &CallLog::default()).await;
        kernel
    }

    #[tokio::test]
    async fn test_caller_without_permission_is_denied() {
        let kernel = secured_kernel().await;
        let err = kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &CallerContext::user("mallory"),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            KernelError::AuthorizationDenied { ref user_id, .. } if user_id == "mallory"
        ));
        assert!(kernel.registry().is_empty());
    }

    #[tokio::test]
    async fn test_realm_permission_is_scoped_to_its_realm() {
        let kernel = secured_kernel().await;
        let caller = CallerContext::user("alice").with_permission("capability:write:journey");

        let err = kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &caller,
            )
            .unwrap_err();
        assert!(matches!(err, KernelError::AuthorizationDenied { .. }));

        let caller = caller.with_permission("capability:write:content");
        assert!(kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &caller,
            )
            .is_ok());
    }

    #[tokio::test]
    async fn test_admin_role_and_system_caller_pass() {
        let kernel = secured_kernel().await;
        let admin = CallerContext::user("ops").with_role("platform_admin");

        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &admin,
            )
            .unwrap();
        kernel
            .registry()
            .register_domain_capability(
                capability("content", "summarize", "content_service", "1.0.0"),
                &CallerContext::system(),
            )
            .unwrap();
        assert_eq!(kernel.registry().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tenant_fails_closed() {
        let kernel = secured_kernel().await;
        let caller = CallerContext::user("eve")
            .with_tenant("initech")
            .with_permission("capability:write");

        let err = kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &caller,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            KernelError::TenantAccessDenied { tenant: Some(ref t), .. } if t == "initech"
        ));
    }

    #[tokio::test]
    async fn test_tenant_publication_is_scoped_and_filtered() {
        let kernel = secured_kernel().await;
        let acme = CallerContext::user("alice")
            .with_tenant("acme")
            .with_permission("capability:write");

        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &acme,
            )
            .unwrap();

        let stored = kernel
            .registry()
            .get_capability(&shared_types::CapabilityKey::new("content", "parse_file"))
            .unwrap();
        assert_eq!(stored.tenant_scope, TenantScope::tenant("acme"));

        let registry = kernel.registry();
        assert_eq!(registry.discover_routes(&RouteQuery::all()).len(), 1);
        assert_eq!(registry.discover_routes(&RouteQuery::all().tenant("acme")).len(), 1);
        assert!(registry
            .discover_routes(&RouteQuery::all().tenant("globex"))
            .is_empty());
    }

    #[tokio::test]
    async fn test_tenant_cannot_overwrite_another_tenants_capability() {
        let kernel = secured_kernel().await;
        let acme = CallerContext::user("alice")
            .with_tenant("acme")
            .with_permission("capability:write");
        let globex = CallerContext::user("bob")
            .with_tenant("globex")
            .with_permission("capability:write");

        kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &acme,
            )
            .unwrap();
        let err = kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "2.0.0"),
                &globex,
            )
            .unwrap_err();

        assert!(matches!(err, KernelError::TenantAccessDenied { .. }));
        assert_eq!(
            kernel
                .registry()
                .discover_by_capability_name("content", "parse_file")
                .map(|d| d.version),
            Some("1.0.0".to_string())
        );
    }

    #[tokio::test]
    async fn test_suspended_tenant_is_denied() {
        let kernel = secured_kernel().await;
        kernel.utilities().tenant().suspend_tenant("acme");
        let acme = CallerContext::user("alice")
            .with_tenant("acme")
            .with_permission("capability:write");

        let err = kernel
            .registry()
            .register_domain_capability(
                capability("content", "parse_file", "content_service", "1.0.0"),
                &acme,
            )
            .unwrap_err();
        assert!(matches!(err, KernelError::TenantAccessDenied { .. }));
    }
}
