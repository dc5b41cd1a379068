//! Route entries derived from registered capabilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{
    CapabilityDefinition, CapabilityKey, Contract, ContractKind, RegisteredCapability, TenantScope,
};

/// Read-only projection of one live capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// `realm/capability_name`
    pub route_id: String,
    pub realm: String,
    /// Logical domain ("pillar").
    pub domain: String,
    pub service_name: String,
    pub capability_name: String,
    pub protocol_name: String,
    pub version: String,
    pub contract_kinds: Vec<ContractKind>,
    /// Path of the REST contract, else of the SOA contract.
    pub path: Option<String>,
    pub method: Option<String>,
    pub handler: Option<String>,
    pub tool_name: Option<String>,
    pub tenant_scope: TenantScope,
    pub registered_at: DateTime<Utc>,
}

impl RouteEntry {
    #[must_use]
    pub fn from_registered(capability: &RegisteredCapability) -> Self {
        let definition = &capability.definition;
        let http = definition
            .contracts
            .get(ContractKind::RestApi)
            .or_else(|| definition.contracts.get(ContractKind::SoaApi));
        let (path, method) = http
            .and_then(Contract::endpoint)
            .map(|(path, method)| (Some(path.to_string()), Some(method.to_ascii_uppercase())))
            .unwrap_or_default();
        let tool_name = match definition.contracts.get(ContractKind::McpTool) {
            Some(Contract::McpTool(tool)) => Some(tool.tool_name.clone()),
            _ => None,
        };

        Self {
            route_id: capability.key().to_string(),
            realm: definition.realm.clone(),
            domain: derive_domain(definition),
            service_name: definition.service_name.clone(),
            capability_name: definition.capability_name.clone(),
            protocol_name: definition.protocol_name.clone(),
            version: definition.version.clone(),
            contract_kinds: definition.contracts.kinds(),
            path,
            method,
            handler: http.and_then(Contract::handler).map(ToString::to_string),
            tool_name,
            tenant_scope: capability.tenant_scope.clone(),
            registered_at: capability.registered_at,
        }
    }

    #[must_use]
    pub fn key(&self) -> CapabilityKey {
        CapabilityKey::new(&self.realm, &self.capability_name)
    }
}

/// Domain of a definition: explicit `domain`, else the pillar segment of the
/// semantic API (`/api/v1/<pillar>-pillar/...`), else the realm.
#[must_use]
pub fn derive_domain(definition: &CapabilityDefinition) -> String {
    if let Some(domain) = definition.domain.as_deref().map(str::trim) {
        if !domain.is_empty() {
            return domain.to_string();
        }
    }

    definition
        .semantic_mapping
        .as_ref()
        .and_then(|mapping| pillar_from_semantic_api(&mapping.semantic_api))
        .unwrap_or_else(|| definition.realm.clone())
}

fn pillar_from_semantic_api(path: &str) -> Option<String> {
    let mut segments = path.trim_start_matches('/').split('/');
    if segments.next()? != "api" {
        return None;
    }
    let version = segments.next()?;
    let is_version = version
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    if !is_version {
        return None;
    }
    segments
        .next()?
        .strip_suffix("-pillar")
        .filter(|pillar| !pillar.is_empty())
        .map(ToString::to_string)
}
