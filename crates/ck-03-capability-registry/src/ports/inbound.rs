//! Inbound port: the registry's public API.

use std::time::Duration;

use ck_04_route_index::{RouteEntry, RouteQuery};
use shared_types::{
    CallerContext, CapabilityDefinition, CapabilityKey, KernelError, RegisteredCapability,
};

use crate::domain::RegistrationOutcome;

/// None of these operations wait on service readiness.
pub trait RegistryApi: Send + Sync {
    /// Authorize, validate and store a definition, then index its route.
    ///
    /// All-or-nothing: on error neither the table nor the route index changed.
    fn register_domain_capability(
        &self,
        definition: CapabilityDefinition,
        caller: &CallerContext,
    ) -> Result<RegistrationOutcome, KernelError>;

    /// Routes matching every set filter. Empty when nothing matches.
    fn discover_routes(&self, query: &RouteQuery) -> Vec<RouteEntry>;

    /// Exact-key lookup. `None` is an answer, not an error.
    fn discover_by_capability_name(
        &self,
        realm: &str,
        capability_name: &str,
    ) -> Option<CapabilityDefinition>;

    /// Every stored capability, sorted by key.
    fn list_capabilities(&self) -> Vec<RegisteredCapability>;

    /// Withdraw one capability and its route.
    ///
    /// Same authorization as publishing into `realm`; a tenant caller may only
    /// withdraw capabilities in its own scope.
    fn unregister_capability(
        &self,
        realm: &str,
        capability_name: &str,
        caller: &CallerContext,
    ) -> Result<RegisteredCapability, KernelError>;

    /// Drop everything `service_name` published. Returns the removed keys.
    fn remove_service_capabilities(&self, service_name: &str) -> Vec<CapabilityKey>;

    /// Drop capabilities whose owner is gone, or stopped or failed for longer than `grace`.
    fn purge_inactive(&self, grace: Duration) -> Vec<CapabilityKey>;
}
