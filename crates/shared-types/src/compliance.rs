//! # Compliance Findings
//!
//! Output of the compliance engine. Structural findings with `Error`
//! severity block a registration; everything else is advisory.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// When a rule is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// Synchronously on every registration; may block.
    Structural,
    /// By the corpus-wide scan.
    Corpus,
    /// Raised directly by a component when the situation occurs.
    Event,
}

/// Identifier of every rule the kernel knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    EmptyContracts,
    BlankField,
    ContractKindMismatch,
    ContractShape,
    InvalidVersion,
    TenantScopeMismatch,
    NonStandardRealm,
    SelfConstructedDependency,
    ProtocolDrift,
    OrphanedCapability,
    StopWithDependents,
    UnbumpedVersion,
}

impl RuleId {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyContracts => "empty_contracts",
            Self::BlankField => "blank_field",
            Self::ContractKindMismatch => "contract_kind_mismatch",
            Self::ContractShape => "contract_shape",
            Self::InvalidVersion => "invalid_version",
            Self::TenantScopeMismatch => "tenant_scope_mismatch",
            Self::NonStandardRealm => "non_standard_realm",
            Self::SelfConstructedDependency => "self_constructed_dependency",
            Self::ProtocolDrift => "protocol_drift",
            Self::OrphanedCapability => "orphaned_capability",
            Self::StopWithDependents => "stop_with_dependents",
            Self::UnbumpedVersion => "unbumped_version",
        }
    }

    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::EmptyContracts
            | Self::BlankField
            | Self::ContractKindMismatch
            | Self::ContractShape
            | Self::InvalidVersion
            | Self::TenantScopeMismatch
            | Self::NonStandardRealm => RuleKind::Structural,
            Self::SelfConstructedDependency | Self::ProtocolDrift | Self::OrphanedCapability => {
                RuleKind::Corpus
            }
            Self::StopWithDependents | Self::UnbumpedVersion => RuleKind::Event,
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceFinding {
    pub rule: RuleId,
    pub severity: Severity,
    /// Capability key (`realm/name`) or service name.
    pub target: String,
    pub message: String,
    pub detected_at: DateTime<Utc>,
}

impl ComplianceFinding {
    pub fn new(
        rule: RuleId,
        severity: Severity,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            severity,
            target: target.into(),
            message: message.into(),
            detected_at: Utc::now(),
        }
    }

    pub fn error(rule: RuleId, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, Severity::Error, target, message)
    }

    pub fn warning(rule: RuleId, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, Severity::Warning, target, message)
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error && self.rule.kind() == RuleKind::Structural
    }
}

impl fmt::Display for ComplianceFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} on {}: {}",
            self.severity, self.rule, self.target, self.message
        )
    }
}

/// Anything that accepts findings raised outside a scan.
pub trait FindingSink: Send + Sync {
    fn raise(&self, finding: ComplianceFinding);
}
