//! Short-lived cache of is-implemented answers
//!
//! Keyed on `(event id, scope)` with exact matching: an entry stored with a
//! scope is invisible to unscoped lookups and to lookups with another scope.
//! Writes replace any existing entry and restart its lifetime. Expired
//! entries are dropped when looked up.

use std::time::Duration;

use faas_common::cache::{Cache, CacheConfig, CacheStats};
use faas_common::time::SharedClock;

type ResultKey = (String, Option<String>);

/// Cache of is-implemented results
#[derive(Debug)]
pub struct IsImplementedCache {
    entries: Cache<ResultKey, bool, SharedClock>,
}

impl IsImplementedCache {
    pub fn new(duration: Duration, clock: SharedClock) -> Self {
        let config = CacheConfig::builder().ttl(duration).track_metrics(true).build();
        Self { entries: Cache::with_clock(config, clock) }
    }

    /// Cached answer for the exact `(event_id, scope)` pair
    pub fn get(&self, event_id: &str, scope: Option<&str>) -> Option<bool> {
        self.entries.get(&key(event_id, scope))
    }

    /// Store an answer, replacing any previous one for the same pair
    pub fn put(&self, event_id: &str, is_implemented: bool, scope: Option<&str>) {
        self.entries.insert(key(event_id, scope), is_implemented);
    }

    /// Drop a cached answer
    pub fn invalidate(&self, event_id: &str, scope: Option<&str>) {
        self.entries.remove(&key(event_id, scope));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }
}

fn key(event_id: &str, scope: Option<&str>) -> ResultKey {
    (event_id.to_string(), scope.map(str::to_string))
}
