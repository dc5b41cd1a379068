//! # Core Domain Entities
//!
//! Capability definitions and the typed contracts they carry, plus the
//! read-only snapshots components exchange through their ports.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::health::HealthRecord;
use crate::lifecycle::LifecycleState;

// =============================================================================
// SCOPING
// =============================================================================

/// Visibility scope of a service or capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantScope {
    /// Visible to every tenant.
    #[default]
    Global,
    /// Visible only to the named tenant.
    Tenant(String),
}

impl TenantScope {
    /// Create a tenant-restricted scope.
    pub fn tenant(id: impl Into<String>) -> Self {
        Self::Tenant(id.into())
    }

    /// The tenant id, if restricted.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Tenant(id) => Some(id),
        }
    }

    /// Whether a viewer in `tenant` can see something in this scope.
    ///
    /// `None` is the platform-wide view and sees everything.
    #[must_use]
    pub fn visible_to(&self, tenant: Option<&str>) -> bool {
        match (self, tenant) {
            (_, None) | (Self::Global, _) => true,
            (Self::Tenant(owner), Some(viewer)) => owner == viewer,
        }
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Tenant(id) => write!(f, "tenant:{id}"),
        }
    }
}

/// Registry key of a capability: unique per `(realm, capability_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CapabilityKey {
    pub realm: String,
    pub capability_name: String,
}

impl CapabilityKey {
    pub fn new(realm: impl Into<String>, capability_name: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            capability_name: capability_name.into(),
        }
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.realm, self.capability_name)
    }
}

// =============================================================================
// CONTRACTS
// =============================================================================

/// The closed set of contract kinds a capability may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    /// Service-oriented remote operation.
    SoaApi,
    /// Plain REST endpoint.
    RestApi,
    /// Tool invocation descriptor.
    McpTool,
}

impl ContractKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SoaApi => "soa_api",
            Self::RestApi => "rest_api",
            Self::McpTool => "mcp_tool",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote operation exposed through the service-oriented API layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoaApiContract {
    pub api_name: String,
    pub endpoint: String,
    pub method: String,
    pub handler: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter name to JSON schema fragment.
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

/// Plain REST endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestApiContract {
    pub endpoint: String,
    pub method: String,
    pub handler: String,
}

/// Tool invocation descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolContract {
    pub tool_name: String,
    pub description: String,
    /// JSON schema of the tool input; must describe an object.
    pub input_schema: serde_json::Value,
}

/// A typed contract payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Contract {
    SoaApi(SoaApiContract),
    RestApi(RestApiContract),
    McpTool(McpToolContract),
}

impl Contract {
    /// The kind this payload belongs to.
    #[must_use]
    pub fn kind(&self) -> ContractKind {
        match self {
            Self::SoaApi(_) => ContractKind::SoaApi,
            Self::RestApi(_) => ContractKind::RestApi,
            Self::McpTool(_) => ContractKind::McpTool,
        }
    }

    /// Endpoint and method for network-callable contracts.
    #[must_use]
    pub fn endpoint(&self) -> Option<(&str, &str)> {
        match self {
            Self::SoaApi(c) => Some((&c.endpoint, &c.method)),
            Self::RestApi(c) => Some((&c.endpoint, &c.method)),
            Self::McpTool(_) => None,
        }
    }

    /// Handler reference, if the contract names one.
    #[must_use]
    pub fn handler(&self) -> Option<&str> {
        match self {
            Self::SoaApi(c) => Some(&c.handler),
            Self::RestApi(c) => Some(&c.handler),
            Self::McpTool(_) => None,
        }
    }
}

/// Mapping from contract kind to payload.
///
/// [`ContractSet::insert`] keys a payload by its own kind. [`ContractSet::declare`]
/// keeps whatever key the publisher supplied so that a mismatched declaration
/// can be reported by structural validation instead of silently corrected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractSet(BTreeMap<ContractKind, Contract>);

impl ContractSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a payload under its own kind, replacing any previous one.
    pub fn insert(&mut self, contract: Contract) -> Option<Contract> {
        self.0.insert(contract.kind(), contract)
    }

    /// Insert a payload under an explicitly declared kind.
    pub fn declare(&mut self, kind: ContractKind, contract: Contract) -> Option<Contract> {
        self.0.insert(kind, contract)
    }

    #[must_use]
    pub fn with(mut self, contract: Contract) -> Self {
        self.insert(contract);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, kind: ContractKind) -> Option<&Contract> {
        self.0.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContractKind, &Contract)> {
        self.0.iter()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<ContractKind> {
        self.0.keys().copied().collect()
    }
}

impl FromIterator<Contract> for ContractSet {
    fn from_iter<I: IntoIterator<Item = Contract>>(iter: I) -> Self {
        let mut set = Self::new();
        for contract in iter {
            set.insert(contract);
        }
        set
    }
}

/// Human-facing alias of a capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticMapping {
    /// Dotted domain name, e.g. `content.parse_file`.
    pub domain_capability: String,
    /// Public API path, e.g. `/api/v1/content-pillar/parse-file`.
    pub semantic_api: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_journey: Option<String>,
}

// =============================================================================
// CAPABILITY DEFINITION
// =============================================================================

/// A named, versioned unit of functionality published by a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDefinition {
    pub capability_name: String,
    /// Owning service; must be registered in the lifecycle container.
    pub service_name: String,
    /// Logical contract-family identifier.
    pub protocol_name: String,
    pub description: String,
    pub realm: String,
    /// Explicit logical domain; derived from the semantic API when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub contracts: ContractSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_mapping: Option<SemanticMapping>,
    /// Semantic version string.
    pub version: String,
    /// Requested visibility. Tenant callers always publish into their own tenant.
    #[serde(default)]
    pub tenant_scope: TenantScope,
    /// Free-form publisher metadata. The `constructs` key lists components
    /// the service instantiates itself (comma separated).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Metadata key listing self-constructed components.
pub const METADATA_CONSTRUCTS: &str = "constructs";

impl CapabilityDefinition {
    /// Start a definition with the mandatory identity fields.
    pub fn new(
        realm: impl Into<String>,
        capability_name: impl Into<String>,
        service_name: impl Into<String>,
        protocol_name: impl Into<String>,
    ) -> Self {
        Self {
            capability_name: capability_name.into(),
            service_name: service_name.into(),
            protocol_name: protocol_name.into(),
            description: String::new(),
            realm: realm.into(),
            domain: None,
            contracts: ContractSet::new(),
            semantic_mapping: None,
            version: "1.0.0".to_string(),
            tenant_scope: TenantScope::Global,
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_contract(mut self, contract: Contract) -> Self {
        self.contracts.insert(contract);
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_semantic_mapping(mut self, mapping: SemanticMapping) -> Self {
        self.semantic_mapping = Some(mapping);
        self
    }

    #[must_use]
    pub fn with_tenant_scope(mut self, scope: TenantScope) -> Self {
        self.tenant_scope = scope;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn key(&self) -> CapabilityKey {
        CapabilityKey::new(&self.realm, &self.capability_name)
    }

    /// Components the publisher declared it constructs itself.
    #[must_use]
    pub fn constructed_components(&self) -> Vec<&str> {
        self.metadata
            .get(METADATA_CONSTRUCTS)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Hex SHA-256 over the canonical JSON form.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}

/// A capability as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredCapability {
    pub definition: CapabilityDefinition,
    /// Effective scope after applying the caller's tenant.
    pub tenant_scope: TenantScope,
    pub registered_at: DateTime<Utc>,
    pub registered_by: String,
    pub fingerprint: String,
}

impl RegisteredCapability {
    #[must_use]
    pub fn key(&self) -> CapabilityKey {
        self.definition.key()
    }
}

/// Read-only view of a service registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    pub name: String,
    pub state: LifecycleState,
    pub state_changed_at: DateTime<Utc>,
    pub dependencies: Vec<String>,
    pub tenant_scope: TenantScope,
    pub last_health: Option<HealthRecord>,
    pub last_error: Option<String>,
}
