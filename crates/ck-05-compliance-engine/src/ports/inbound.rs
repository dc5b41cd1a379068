//! Driving Port (API)

use shared_types::{CallerContext, CapabilityDefinition, ComplianceFinding, RuleId};

use crate::domain::{ScanReport, ViolationFilter, ViolationSummary};
use crate::ports::outbound::CorpusSource;

/// Operations exposed to the registry and to operational tooling.
pub trait ComplianceApi: Send + Sync {
    /// Run structural rules on `definition`, record the result and return it.
    ///
    /// The caller rejects the registration if any returned finding is blocking.
    fn validate_definition(
        &self,
        definition: &CapabilityDefinition,
        caller: &CallerContext,
    ) -> Vec<ComplianceFinding>;

    /// Run every corpus rule over `source`, replacing the previous scan's findings.
    fn scan_corpus(&self, source: &dyn CorpusSource) -> ScanReport;

    /// Recorded findings matching `filter`. Side-effect free.
    fn get_violations(&self, filter: &ViolationFilter) -> Vec<ComplianceFinding>;

    /// Counts over every recorded finding. Side-effect free.
    fn get_violation_summary(&self) -> ViolationSummary;

    /// Drop findings of `rule`, or all of them.
    fn clear_violations(&self, rule: Option<RuleId>) -> usize;
}
