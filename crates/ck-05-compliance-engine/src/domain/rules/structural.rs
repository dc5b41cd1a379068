//! Synchronous checks on a single definition. Error findings block registration.

use std::collections::BTreeSet;

use shared_types::{
    CallerContext, CapabilityDefinition, ComplianceFinding, Contract, McpToolContract, RuleId,
    TenantScope,
};

/// HTTP methods accepted on REST and SOA contracts.
pub const ALLOWED_METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

pub struct StructuralValidator<'a> {
    standard_realms: &'a BTreeSet<String>,
}

impl<'a> StructuralValidator<'a> {
    #[must_use]
    pub fn new(standard_realms: &'a BTreeSet<String>) -> Self {
        Self { standard_realms }
    }

    /// Every structural finding for `definition` submitted by `caller`.
    #[must_use]
    pub fn validate(
        &self,
        definition: &CapabilityDefinition,
        caller: &CallerContext,
    ) -> Vec<ComplianceFinding> {
        let target = definition.key().to_string();
        let mut findings = Vec::new();

        if definition.contracts.is_empty() {
            findings.push(ComplianceFinding::error(
                RuleId::EmptyContracts,
                &target,
                "capability declares no contracts",
            ));
        }

        for (field, value) in [
            ("capability_name", &definition.capability_name),
            ("service_name", &definition.service_name),
            ("realm", &definition.realm),
        ] {
            if value.trim().is_empty() {
                findings.push(ComplianceFinding::error(
                    RuleId::BlankField,
                    &target,
                    format!("{field} is blank"),
                ));
            }
        }

        for (kind, contract) in definition.contracts.iter() {
            if contract.kind() != *kind {
                findings.push(ComplianceFinding::error(
                    RuleId::ContractKindMismatch,
                    &target,
                    format!("{} payload declared under {kind}", contract.kind()),
                ));
            }
            for problem in contract_shape_problems(contract) {
                findings.push(ComplianceFinding::error(
                    RuleId::ContractShape,
                    &target,
                    format!("{}: {problem}", contract.kind()),
                ));
            }
        }

        if let Err(e) = semver::Version::parse(&definition.version) {
            findings.push(ComplianceFinding::error(
                RuleId::InvalidVersion,
                &target,
                format!("version '{}' is not semantic: {e}", definition.version),
            ));
        }

        if let (Some(tenant), TenantScope::Tenant(owner)) =
            (caller.tenant_id.as_deref(), &definition.tenant_scope)
        {
            if owner != tenant {
                findings.push(ComplianceFinding::error(
                    RuleId::TenantScopeMismatch,
                    &target,
                    format!("caller acts for tenant '{tenant}' but definition is scoped to '{owner}'"),
                ));
            }
        }

        if !definition.realm.trim().is_empty() && !self.standard_realms.contains(&definition.realm)
        {
            findings.push(ComplianceFinding::warning(
                RuleId::NonStandardRealm,
                &target,
                format!("realm '{}' is not a standard realm", definition.realm),
            ));
        }

        findings
    }
}

fn contract_shape_problems(contract: &Contract) -> Vec<String> {
    let mut problems = Vec::new();

    if let Some((endpoint, method)) = contract.endpoint() {
        if !endpoint.starts_with('/') {
            problems.push(format!("endpoint '{endpoint}' must start with '/'"));
        }
        if !ALLOWED_METHODS.contains(&method.to_ascii_uppercase().as_str()) {
            problems.push(format!("method '{method}' is not an HTTP method"));
        }
    }
    if let Some(handler) = contract.handler() {
        if handler.trim().is_empty() {
            problems.push("handler is blank".to_string());
        }
    }

    match contract {
        Contract::SoaApi(soa) if soa.api_name.trim().is_empty() => {
            problems.push("api_name is blank".to_string());
        }
        Contract::McpTool(tool) => problems.extend(tool_problems(tool)),
        _ => {}
    }

    problems
}

fn tool_problems(tool: &McpToolContract) -> Vec<String> {
    let mut problems = Vec::new();
    if tool.tool_name.trim().is_empty() {
        problems.push("tool_name is blank".to_string());
    }
    match tool.input_schema.as_object() {
        None => problems.push("input_schema must be a JSON object".to_string()),
        Some(schema) => {
            if let Some(ty) = schema.get("type") {
                if ty.as_str() != Some("object") {
                    problems.push(format!("input_schema type must be \"object\", got {ty}"));
                }
            }
        }
    }
    problems
}
