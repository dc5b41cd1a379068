//! Route queries.

use super::entry::RouteEntry;

/// AND filter. `None` fields match everything.
///
/// `tenant: None` is the platform-wide view; `Some(t)` sees global entries
/// plus those scoped to `t`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteQuery {
    pub realm: Option<String>,
    pub domain: Option<String>,
    pub service_name: Option<String>,
    pub tenant: Option<String>,
}

impl RouteQuery {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn service(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    #[must_use]
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    #[must_use]
    pub fn matches(&self, entry: &RouteEntry) -> bool {
        fn field(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().map_or(true, |f| f == value)
        }

        field(&self.realm, &entry.realm)
            && field(&self.domain, &entry.domain)
            && field(&self.service_name, &entry.service_name)
            && entry.tenant_scope.visible_to(self.tenant.as_deref())
    }
}
