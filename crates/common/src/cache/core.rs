//! Core cache implementation with TTL expiry
//!
//! Expiry is lazy: an entry whose TTL has elapsed is dropped the next time it
//! is looked up (or by an explicit [`Cache::cleanup_expired`]). Nothing runs in
//! the background.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::config::CacheConfig;
use super::stats::{CacheStats, MetricsCollector};
use crate::time::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Generic thread-safe cache with TTL expiry
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash + Clone`)
/// - `V`: Value type (must be `Clone`)
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use faas_common::cache::{Cache, CacheConfig};
///
/// let cache: Cache<String, bool> = Cache::new(CacheConfig::ttl(Duration::from_secs(60)));
/// cache.insert("event".to_string(), true);
/// assert_eq!(cache.get(&"event".to_string()), Some(true));
/// ```
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache with the given configuration using system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Insert a value, replacing any existing entry for the key.
    ///
    /// A replaced entry's age restarts from now.
    pub fn insert(&self, key: K, value: V) {
        let now = self.clock.now();
        self.entries.write().insert(key, CacheEntry { value, inserted_at: now });

        if self.config.track_metrics {
            self.metrics.record_insert();
        }
    }

    /// Get a live value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or its entry has expired; an
    /// expired entry is removed on the way out. A hit never changes the
    /// entry's value or age.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.write();

        let Some(entry) = entries.get(key) else {
            if self.config.track_metrics {
                self.metrics.record_miss();
            }
            return None;
        };

        if self.is_expired(entry.inserted_at, now) {
            entries.remove(key);
            if self.config.track_metrics {
                self.metrics.record_miss();
                self.metrics.record_expiration();
            }
            return None;
        }

        let value = entry.value.clone();
        if self.config.track_metrics {
            self.metrics.record_hit();
        }
        Some(value)
    }

    /// Remaining lifetime of a live entry, `None` when absent or expired.
    ///
    /// Entries in a cache without TTL report `Duration::MAX`.
    pub fn time_to_live(&self, key: &K) -> Option<Duration> {
        let now = self.clock.now();
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        match self.config.ttl {
            None => Some(Duration::MAX),
            Some(ttl) => {
                let age = now.saturating_duration_since(entry.inserted_at);
                ttl.checked_sub(age).filter(|left| !left.is_zero())
            }
        }
    }

    /// Remove a value from the cache
    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().remove(key).map(|e| e.value)
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        self.entries.write().clear();

        if self.config.track_metrics {
            self.metrics.reset();
        }
    }

    /// Get the current number of entries, expired ones included until pruned
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        if self.config.ttl.is_none() {
            return 0;
        }

        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry.inserted_at, now));
        let removed = before - entries.len();

        if self.config.track_metrics {
            for _ in 0..removed {
                self.metrics.record_expiration();
            }
        }

        removed
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len())
    }

    fn is_expired(&self, inserted_at: Instant, now: Instant) -> bool {
        self.config.ttl.is_some_and(|ttl| now.saturating_duration_since(inserted_at) >= ttl)
    }
}

impl<K, V, C> std::fmt::Debug for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("config", &self.config).field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the TTL cache
    //!
    //! Time is driven by `MockClock` so that expiry boundaries are exact.

    use std::sync::Arc;

    use super::*;
    use crate::time::MockClock;

    fn ttl_cache(secs: u64) -> (Cache<&'static str, bool, Arc<MockClock>>, Arc<MockClock>) {
        let clock = Arc::new(MockClock::new());
        let config =
            CacheConfig::builder().ttl(Duration::from_secs(secs)).track_metrics(true).build();
        (Cache::with_clock(config, clock.clone()), clock)
    }

    /// Validates `Cache::insert` behavior for the overwrite scenario.
    ///
    /// Assertions:
    /// - Confirms the second write for a key wins.
    /// - Confirms only one entry exists for the key.
    #[test]
    fn test_insert_overwrites_last_write_wins() {
        let (cache, _clock) = ttl_cache(60);

        cache.insert("k", true);
        cache.insert("k", false);

        assert_eq!(cache.get(&"k"), Some(false));
        assert_eq!(cache.len(), 1);
    }

    /// Validates `Cache::insert` behavior for the expiry reset scenario.
    ///
    /// Assertions:
    /// - Confirms overwriting restarts the entry's lifetime.
    #[test]
    fn test_overwrite_resets_expiry() {
        let (cache, clock) = ttl_cache(60);

        cache.insert("k", true);
        clock.advance(Duration::from_secs(50));
        cache.insert("k", false);
        clock.advance(Duration::from_secs(50));

        assert_eq!(cache.get(&"k"), Some(false));
    }

    /// Validates `Cache::get` behavior for the lazy expiry scenario.
    ///
    /// Assertions:
    /// - Confirms an entry is live just before its TTL.
    /// - Confirms the entry is absent exactly at its TTL and removed.
    /// - Confirms the expiration is counted.
    #[test]
    fn test_get_prunes_expired_entry() {
        let (cache, clock) = ttl_cache(60);
        cache.insert("k", true);

        clock.advance(Duration::from_millis(59_999));
        assert_eq!(cache.get(&"k"), Some(true));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get(&"k"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    /// Validates `Cache::get` behavior for the non-mutation scenario.
    ///
    /// Assertions:
    /// - Confirms repeated reads leave the remaining lifetime unchanged.
    #[test]
    fn test_get_does_not_refresh_ttl() {
        let (cache, clock) = ttl_cache(60);
        cache.insert("k", true);
        clock.advance(Duration::from_secs(10));

        let before = cache.time_to_live(&"k");
        for _ in 0..5 {
            assert_eq!(cache.get(&"k"), Some(true));
        }

        assert_eq!(cache.time_to_live(&"k"), before);
        assert_eq!(before, Some(Duration::from_secs(50)));
    }

    /// Validates `Cache::cleanup_expired` behavior for the bulk prune
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms only entries past their TTL are removed.
    #[test]
    fn test_cleanup_expired_removes_only_stale() {
        let (cache, clock) = ttl_cache(10);
        cache.insert("old", true);
        clock.advance(Duration::from_secs(6));
        cache.insert("new", true);
        clock.advance(Duration::from_secs(5));

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.get(&"new"), Some(true));
        assert_eq!(cache.get(&"old"), None);
    }

    /// Validates `Cache::insert` behavior for the many keys scenario.
    ///
    /// Assertions:
    /// - Confirms every distinct key stays readable until its TTL elapses.
    #[test]
    fn test_keeps_every_live_key() {
        let (cache, clock) = ttl_cache(60);
        let keys = ["a", "b", "c", "d", "e", "f", "g", "h"];
        for key in keys {
            cache.insert(key, true);
        }

        assert_eq!(cache.len(), keys.len());
        assert!(keys.iter().all(|key| cache.get(key) == Some(true)));

        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.cleanup_expired(), keys.len());
        assert!(cache.is_empty());
    }

    /// Validates `Cache::clear` behavior for the reset scenario.
    ///
    /// Assertions:
    /// - Confirms entries and counters are cleared.
    #[test]
    fn test_clear() {
        let (cache, _clock) = ttl_cache(60);
        cache.insert("a", true);
        let _ = cache.get(&"a");

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 0);
    }
}
