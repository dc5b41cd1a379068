//! In-memory finding store. Never persisted.
//!
//! Findings live in three buckets with different replacement rules:
//! - structural: replaced per target on every validation of that target
//! - corpus: replaced wholesale by every scan
//! - event: latest finding per (rule, target)

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use shared_types::{ComplianceFinding, RuleId};

use super::violations::{ViolationFilter, ViolationSummary};

#[derive(Debug, Default)]
pub struct FindingStore {
    structural: BTreeMap<String, Vec<ComplianceFinding>>,
    corpus: Vec<ComplianceFinding>,
    event: BTreeMap<(RuleId, String), ComplianceFinding>,
    last_updated: Option<DateTime<Utc>>,
}

impl FindingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_structural(&mut self, target: &str, findings: Vec<ComplianceFinding>) {
        if findings.is_empty() {
            self.structural.remove(target);
        } else {
            self.structural.insert(target.to_string(), findings);
        }
        self.touch();
    }

    /// Swap in a new scan result. Returns the findings that were not present before.
    pub fn replace_corpus(&mut self, findings: Vec<ComplianceFinding>) -> Vec<ComplianceFinding> {
        let previous: HashSet<(RuleId, &str, &str)> = self
            .corpus
            .iter()
            .map(|f| (f.rule, f.target.as_str(), f.message.as_str()))
            .collect();
        let fresh: Vec<ComplianceFinding> = findings
            .iter()
            .filter(|f| !previous.contains(&(f.rule, f.target.as_str(), f.message.as_str())))
            .cloned()
            .collect();

        self.corpus = findings;
        self.touch();
        fresh
    }

    pub fn record_event(&mut self, finding: ComplianceFinding) {
        self.event
            .insert((finding.rule, finding.target.clone()), finding);
        self.touch();
    }

    fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }

    fn iter(&self) -> impl Iterator<Item = &ComplianceFinding> {
        self.structural
            .values()
            .flatten()
            .chain(self.corpus.iter())
            .chain(self.event.values())
    }

    /// Matching findings, most severe first, then by rule and target.
    #[must_use]
    pub fn query(&self, filter: &ViolationFilter) -> Vec<ComplianceFinding> {
        let mut out: Vec<ComplianceFinding> =
            self.iter().filter(|f| filter.matches(f)).cloned().collect();
        out.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(a.rule.cmp(&b.rule))
                .then(a.target.cmp(&b.target))
        });
        out
    }

    #[must_use]
    pub fn summary(&self) -> ViolationSummary {
        ViolationSummary::from_findings(self.iter(), self.last_updated)
    }

    /// Drop findings of `rule`, or everything. Returns how many were removed.
    pub fn clear(&mut self, rule: Option<RuleId>) -> usize {
        let before = self.len();
        match rule {
            None => {
                self.structural.clear();
                self.corpus.clear();
                self.event.clear();
            }
            Some(rule) => {
                for findings in self.structural.values_mut() {
                    findings.retain(|f| f.rule != rule);
                }
                self.structural.retain(|_, findings| !findings.is_empty());
                self.corpus.retain(|f| f.rule != rule);
                self.event.retain(|(r, _), _| *r != rule);
            }
        }
        let removed = before - self.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
