//! # Compliance Engine
//!
//! Two kinds of checks over published capabilities:
//!
//! 1. **Structural validation**, synchronous, on every registration. Error
//!    findings make the registry reject the definition; nothing is stored.
//! 2. **Corpus anti-pattern detection**, asynchronous, advisory. Warnings
//!    only; never blocks a registration.
//!
//! The engine is read-only with respect to the registry. It reads a snapshot
//! through [`CorpusSource`] and owns nothing but its findings.
//!
//! ```text
//!  register_domain_capability ──→ validate_definition ──→ FindingStore (structural)
//!  bus: Capability/Lifecycle ──→ scanner ──→ scan_corpus ──→ FindingStore (corpus)
//!  LifecycleContainer / Registry ──→ FindingSink::raise ──→ FindingStore (event)
//! ```
//!
//! Findings are in memory only and recomputed on demand.

pub mod domain;
pub mod ports;
pub mod scanner;
pub mod service;

pub use domain::*;
pub use ports::{ComplianceApi, CorpusSource};
pub use scanner::spawn_scanner;
pub use service::ComplianceEngine;
