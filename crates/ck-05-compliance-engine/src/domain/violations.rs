//! Query and summary types for recorded findings.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{ComplianceFinding, RuleId, Severity};

/// AND filter over recorded findings. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationFilter {
    pub rule: Option<RuleId>,
    pub severity: Option<Severity>,
    pub target: Option<String>,
}

impl ViolationFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rule(mut self, rule: RuleId) -> Self {
        self.rule = Some(rule);
        self
    }

    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn matches(&self, finding: &ComplianceFinding) -> bool {
        self.rule.map_or(true, |r| r == finding.rule)
            && self.severity.map_or(true, |s| s == finding.severity)
            && self.target.as_deref().map_or(true, |t| t == finding.target)
    }
}

/// Counts over every recorded finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationSummary {
    pub total: usize,
    pub by_rule: BTreeMap<RuleId, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_target: BTreeMap<String, usize>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ViolationSummary {
    #[must_use]
    pub fn from_findings<'a>(
        findings: impl IntoIterator<Item = &'a ComplianceFinding>,
        last_updated: Option<DateTime<Utc>>,
    ) -> Self {
        let mut summary = Self {
            last_updated,
            ..Self::default()
        };
        for finding in findings {
            summary.total += 1;
            *summary.by_rule.entry(finding.rule).or_insert(0) += 1;
            *summary.by_severity.entry(finding.severity).or_insert(0) += 1;
            *summary.by_target.entry(finding.target.clone()).or_insert(0) += 1;
        }
        summary
    }

    #[must_use]
    pub fn errors(&self) -> usize {
        self.by_severity.get(&Severity::Error).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn warnings(&self) -> usize {
        self.by_severity.get(&Severity::Warning).copied().unwrap_or(0)
    }
}

/// Outcome of one corpus scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub capabilities_scanned: usize,
    pub services_scanned: usize,
    pub findings: usize,
    /// Findings not present in the previous scan.
    pub new_findings: usize,
    pub elapsed: Duration,
}
