//! The index itself: one table plus three secondary indexes under one lock.

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;
use shared_types::CapabilityKey;
use tracing::debug;

use crate::domain::{RouteEntry, RouteQuery};

#[derive(Debug, Default)]
struct IndexInner {
    entries: HashMap<CapabilityKey, RouteEntry>,
    by_realm: HashMap<String, BTreeSet<CapabilityKey>>,
    by_domain: HashMap<String, BTreeSet<CapabilityKey>>,
    by_service: HashMap<String, BTreeSet<CapabilityKey>>,
}

impl IndexInner {
    fn link(&mut self, key: &CapabilityKey, entry: &RouteEntry) {
        for (index, value) in [
            (&mut self.by_realm, &entry.realm),
            (&mut self.by_domain, &entry.domain),
            (&mut self.by_service, &entry.service_name),
        ] {
            index.entry(value.clone()).or_default().insert(key.clone());
        }
    }

    fn unlink(&mut self, key: &CapabilityKey, entry: &RouteEntry) {
        for (index, value) in [
            (&mut self.by_realm, &entry.realm),
            (&mut self.by_domain, &entry.domain),
            (&mut self.by_service, &entry.service_name),
        ] {
            if let Some(keys) = index.get_mut(value) {
                keys.remove(key);
                if keys.is_empty() {
                    index.remove(value);
                }
            }
        }
    }

    fn remove(&mut self, key: &CapabilityKey) -> Option<RouteEntry> {
        let entry = self.entries.remove(key)?;
        self.unlink(key, &entry);
        Some(entry)
    }
}

/// Derived, queryable projection of the capability registry.
///
/// Writers are expected to hold the capability table's write lock while
/// calling [`RouteIndex::upsert`] / [`RouteIndex::remove`], so the index
/// never disagrees with the table it projects.
#[derive(Debug, Default)]
pub struct RouteIndex {
    inner: RwLock<IndexInner>,
}

impl RouteIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the route for `entry.key()`. Returns the replaced entry.
    pub fn upsert(&self, entry: RouteEntry) -> Option<RouteEntry> {
        let key = entry.key();
        let mut inner = self.inner.write();
        let previous = inner.remove(&key);
        inner.link(&key, &entry);
        debug!(route = %entry.route_id, domain = %entry.domain, "[RouteIndex] Upserted");
        inner.entries.insert(key, entry);
        previous
    }

    pub fn remove(&self, key: &CapabilityKey) -> Option<RouteEntry> {
        self.inner.write().remove(key)
    }

    /// Drop every route owned by `service_name`.
    pub fn remove_service(&self, service_name: &str) -> Vec<RouteEntry> {
        let mut inner = self.inner.write();
        let keys: Vec<CapabilityKey> = inner
            .by_service
            .get(service_name)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default();
        keys.iter().filter_map(|key| inner.remove(key)).collect()
    }

    /// Matching routes sorted by route id. Empty when nothing matches.
    #[must_use]
    pub fn query(&self, query: &RouteQuery) -> Vec<RouteEntry> {
        let inner = self.inner.read();

        let candidates = [
            query.realm.as_ref().map(|v| inner.by_realm.get(v)),
            query.domain.as_ref().map(|v| inner.by_domain.get(v)),
            query.service_name.as_ref().map(|v| inner.by_service.get(v)),
        ]
        .into_iter()
        .flatten()
        .min_by_key(|keys| keys.map_or(0, BTreeSet::len));

        let mut routes: Vec<RouteEntry> = match candidates {
            // A filter was given but nothing is indexed under it.
            Some(None) => Vec::new(),
            Some(Some(keys)) => keys
                .iter()
                .filter_map(|key| inner.entries.get(key))
                .filter(|entry| query.matches(entry))
                .cloned()
                .collect(),
            None => inner
                .entries
                .values()
                .filter(|entry| query.matches(entry))
                .cloned()
                .collect(),
        };

        routes.sort_by(|a, b| a.route_id.cmp(&b.route_id));
        routes
    }

    /// Distinct domains currently indexed, sorted.
    #[must_use]
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.inner.read().by_domain.keys().cloned().collect();
        domains.sort();
        domains
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
