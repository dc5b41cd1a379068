//! # Capability Registry
//!
//! Stores capability definitions published by running services and keeps
//! the route index in step with them.
//!
//! ## Registration Pipeline
//!
//! ```text
//! register_domain_capability(definition, caller)
//!     │
//!     ├─ 1. SecurityAuthorizer   write on capability_registry/<realm>
//!     ├─ 2. TenantValidator      tenant callers publish into their own scope
//!     ├─ 3. ComplianceEngine     structural rules; any Error finding rejects
//!     ├─ 4. ServiceDirectory     owner must be Initializing or Started
//!     ├─ 5. versioning::decide   (table write lock held from here)
//!     ├─ 6. RouteIndex::upsert   (still under the table lock)
//!     └─ 7. event + metrics      (locks released)
//! ```
//!
//! Steps 1 to 4 touch no registry state, so a rejected call leaves nothing
//! behind. Downgrades follow [`DowngradePolicy`].
//!
//! ## Discovery
//!
//! `discover_routes` hides routes whose owner is not Initializing, Started or
//! Degraded. No match yields an empty vector, never an error.
//!
//! ## Withdrawal
//!
//! `unregister_capability` removes one key and its route under the table
//! lock. `remove_service_capabilities` and `purge_inactive` do the same for
//! every key of a service. Each path tells the compliance engine to forget
//! the withdrawn keys.

pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use domain::*;
pub use ports::{RegistryApi, ServiceDirectory};
pub use service::CapabilityRegistry;
