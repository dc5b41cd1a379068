//! Corpus-wide anti-pattern detection. Every finding is a Warning.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use shared_types::{CapabilityKey, ComplianceFinding, RegisteredCapability, RuleId, ServiceSnapshot};

/// One scan over a snapshot of the registry and the container.
pub struct CorpusScan<'a> {
    capabilities: &'a [RegisteredCapability],
    services: HashMap<&'a str, &'a ServiceSnapshot>,
    protocol_history: &'a HashMap<CapabilityKey, BTreeSet<String>>,
}

impl<'a> CorpusScan<'a> {
    #[must_use]
    pub fn new(
        capabilities: &'a [RegisteredCapability],
        services: &'a [ServiceSnapshot],
        protocol_history: &'a HashMap<CapabilityKey, BTreeSet<String>>,
    ) -> Self {
        Self {
            capabilities,
            services: services.iter().map(|s| (s.name.as_str(), s)).collect(),
            protocol_history,
        }
    }

    /// Run every corpus rule. Output is sorted by (rule, target, message).
    #[must_use]
    pub fn run(&self) -> Vec<ComplianceFinding> {
        let mut findings: Vec<ComplianceFinding> = self
            .capabilities
            .par_iter()
            .flat_map_iter(|capability| {
                let mut out = self.self_constructed(capability);
                out.extend(self.orphaned(capability));
                out
            })
            .collect();

        findings.extend(self.protocol_drift());
        findings.sort_by(|a, b| {
            (a.rule, &a.target, &a.message).cmp(&(b.rule, &b.target, &b.message))
        });
        findings
    }

    /// A capability says its service builds a component that is itself a registered service.
    fn self_constructed(&self, capability: &RegisteredCapability) -> Vec<ComplianceFinding> {
        let definition = &capability.definition;
        let declared: &[String] = self
            .services
            .get(definition.service_name.as_str())
            .map(|s| s.dependencies.as_slice())
            .unwrap_or_default();

        definition
            .constructed_components()
            .into_iter()
            .filter(|component| self.services.contains_key(component))
            .map(|component| {
                let message = if declared.iter().any(|d| d == component) {
                    format!(
                        "'{}' constructs its declared dependency '{component}' instead of receiving it from the container",
                        definition.service_name
                    )
                } else {
                    format!(
                        "'{}' constructs registered service '{component}' without declaring it as a dependency",
                        definition.service_name
                    )
                };
                ComplianceFinding::warning(
                    RuleId::SelfConstructedDependency,
                    &definition.service_name,
                    message,
                )
            })
            .collect()
    }

    /// The owning service is gone or no longer running.
    fn orphaned(&self, capability: &RegisteredCapability) -> Option<ComplianceFinding> {
        let definition = &capability.definition;
        let reason = match self.services.get(definition.service_name.as_str()) {
            None => "is not registered".to_string(),
            Some(service) if service.state.is_terminal() => format!("is {}", service.state),
            Some(_) => return None,
        };
        Some(ComplianceFinding::warning(
            RuleId::OrphanedCapability,
            capability.key().to_string(),
            format!("owning service '{}' {reason}", definition.service_name),
        ))
    }

    /// The same key has been published under more than one protocol.
    fn protocol_drift(&self) -> Vec<ComplianceFinding> {
        let mut protocols: BTreeMap<CapabilityKey, BTreeSet<&str>> = BTreeMap::new();
        for capability in self.capabilities {
            let key = capability.key();
            let entry = protocols.entry(key.clone()).or_default();
            entry.insert(capability.definition.protocol_name.as_str());
            if let Some(history) = self.protocol_history.get(&key) {
                entry.extend(history.iter().map(String::as_str));
            }
        }

        protocols
            .into_iter()
            .filter(|(_, seen)| seen.len() > 1)
            .map(|(key, seen)| {
                ComplianceFinding::warning(
                    RuleId::ProtocolDrift,
                    key.to_string(),
                    format!(
                        "published under mismatched protocols: {}",
                        seen.into_iter().collect::<Vec<_>>().join(", ")
                    ),
                )
            })
            .collect()
    }
}
