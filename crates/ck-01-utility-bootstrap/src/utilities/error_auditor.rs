//! Bounded audit trail of recent service errors.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditedError {
    pub service: String,
    pub kind: String,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct AuditLog {
    recent: VecDeque<AuditedError>,
    per_service: HashMap<String, u64>,
    total: u64,
}

/// Keeps the last `capacity` errors and a per-service count of all errors seen.
#[derive(Debug)]
pub struct ErrorAuditor {
    capacity: usize,
    log: Mutex<AuditLog>,
}

impl ErrorAuditor {
    /// Returns `None` for a zero capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Option<Self> {
        (capacity > 0).then(|| Self {
            capacity,
            log: Mutex::new(AuditLog::default()),
        })
    }

    pub fn record(&self, service: &str, kind: &str, message: &str) {
        error!(service = %service, kind = %kind, "{}", message);

        let mut log = self.log.lock();
        if log.recent.len() == self.capacity {
            log.recent.pop_front();
        }
        log.recent.push_back(AuditedError {
            service: service.to_string(),
            kind: kind.to_string(),
            message: message.to_string(),
            recorded_at: Utc::now(),
        });
        *log.per_service.entry(service.to_string()).or_insert(0) += 1;
        log.total += 1;
    }

    /// Most recent errors, newest last.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<AuditedError> {
        let log = self.log.lock();
        let skip = log.recent.len().saturating_sub(limit);
        log.recent.iter().skip(skip).cloned().collect()
    }

    #[must_use]
    pub fn count_for(&self, service: &str) -> u64 {
        self.log.lock().per_service.get(service).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.log.lock().total
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
