//! Compliance Engine service.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use kernel_telemetry::KernelMetrics;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, KernelEvent};
use shared_types::{
    CallerContext, CapabilityDefinition, CapabilityKey, ComplianceFinding, FindingSink, RuleId,
};
use tracing::{debug, info, warn};

use crate::domain::{
    ComplianceConfig, CorpusScan, FindingStore, ScanReport, StructuralValidator, ViolationFilter,
    ViolationSummary,
};
use crate::ports::{ComplianceApi, CorpusSource};

/// Read-only with respect to the registry; owns only its findings.
pub struct ComplianceEngine {
    config: ComplianceConfig,
    store: RwLock<FindingStore>,
    /// Protocol names accepted per live key, for drift detection.
    protocol_history: RwLock<HashMap<CapabilityKey, BTreeSet<String>>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    metrics: Option<KernelMetrics>,
}

impl ComplianceEngine {
    #[must_use]
    pub fn new(config: ComplianceConfig) -> Self {
        Self {
            config,
            store: RwLock::new(FindingStore::new()),
            protocol_history: RwLock::new(HashMap::new()),
            publisher: None,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: KernelMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    /// Note a definition the registry stored.
    pub fn record_accepted(&self, definition: &CapabilityDefinition) {
        self.protocol_history
            .write()
            .entry(definition.key())
            .or_default()
            .insert(definition.protocol_name.clone());
    }

    /// Drop the protocol history of withdrawn keys.
    pub fn forget(&self, keys: &[CapabilityKey]) {
        if keys.is_empty() {
            return;
        }
        let mut history = self.protocol_history.write();
        for key in keys {
            history.remove(key);
        }
        debug!(keys = keys.len(), "[Compliance] Forgot withdrawn capabilities");
    }

    fn announce(&self, finding: &ComplianceFinding) {
        if let Some(metrics) = &self.metrics {
            metrics
                .compliance_findings
                .with_label_values(&[finding.severity.to_string().as_str()])
                .inc();
        }
        if let Some(publisher) = &self.publisher {
            publisher.publish(KernelEvent::ComplianceFindingRaised(finding.clone()));
        }
    }
}

impl ComplianceApi for ComplianceEngine {
    fn validate_definition(
        &self,
        definition: &CapabilityDefinition,
        caller: &CallerContext,
    ) -> Vec<ComplianceFinding> {
        let target = definition.key().to_string();
        let findings =
            StructuralValidator::new(&self.config.standard_realms).validate(definition, caller);

        for finding in &findings {
            if finding.is_blocking() {
                warn!(subject = %target, rule = %finding.rule, "[Compliance] {}", finding.message);
            } else {
                debug!(subject = %target, rule = %finding.rule, "[Compliance] {}", finding.message);
            }
            self.announce(finding);
        }

        self.store
            .write()
            .replace_structural(&target, findings.clone());
        findings
    }

    fn scan_corpus(&self, source: &dyn CorpusSource) -> ScanReport {
        let started = Instant::now();
        let capabilities = source.capabilities();
        let services = source.services();
        let history = self.protocol_history.read().clone();

        let findings = CorpusScan::new(&capabilities, &services, &history).run();
        let total = findings.len();
        let fresh = self.store.write().replace_corpus(findings);

        for finding in &fresh {
            warn!(subject = %finding.target, rule = %finding.rule, "[Compliance] {}", finding.message);
            self.announce(finding);
        }

        let report = ScanReport {
            capabilities_scanned: capabilities.len(),
            services_scanned: services.len(),
            findings: total,
            new_findings: fresh.len(),
            elapsed: started.elapsed(),
        };
        info!(
            capabilities = report.capabilities_scanned,
            services = report.services_scanned,
            findings = report.findings,
            new = report.new_findings,
            "[Compliance] Corpus scan complete"
        );
        report
    }

    fn get_violations(&self, filter: &ViolationFilter) -> Vec<ComplianceFinding> {
        self.store.read().query(filter)
    }

    fn get_violation_summary(&self) -> ViolationSummary {
        self.store.read().summary()
    }

    fn clear_violations(&self, rule: Option<RuleId>) -> usize {
        let removed = self.store.write().clear(rule);
        info!(rule = ?rule, removed, "[Compliance] Violations cleared");
        removed
    }
}

impl FindingSink for ComplianceEngine {
    fn raise(&self, finding: ComplianceFinding) {
        warn!(subject = %finding.target, rule = %finding.rule, "[Compliance] {}", finding.message);
        self.announce(&finding);
        self.store.write().record_event(finding);
    }
}
