//! In-memory TTL cache with stale-but-available semantics.
//!
//! Entries are never evicted. A lookup past the TTL still returns the last
//! stored value; callers decide whether to refresh by checking
//! [`CacheStore::is_stale`]. A failed refresh simply leaves the old entry in
//! place.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// A cached value plus the metadata needed to judge its freshness.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: Instant,
    /// Wall-clock time of the fetch, for display and logging.
    pub fetched_at_utc: DateTime<Utc>,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    #[must_use]
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.age() > self.ttl
    }
}

/// String-keyed TTL cache shared behind an `Arc`.
///
/// The lock is synchronous and only held for map operations, never across an
/// `.await`.
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the stored value regardless of age.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        self.read(|entries| entries.get(key).map(|e| e.value.clone()))
    }

    /// Returns the stored value only while it is within its TTL.
    #[must_use]
    pub fn get_fresh(&self, key: &str) -> Option<V> {
        self.read(|entries| {
            entries
                .get(key)
                .filter(|e| !e.is_stale())
                .map(|e| e.value.clone())
        })
    }

    /// Full entry including fetch timestamps.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<CacheEntry<V>> {
        self.read(|entries| entries.get(key).cloned())
    }

    /// `true` when the key is missing or its entry has outlived its TTL.
    #[must_use]
    pub fn is_stale(&self, key: &str) -> bool {
        self.read(|entries| entries.get(key).map_or(true, CacheEntry::is_stale))
    }

    /// Stores `value` with the default TTL, replacing any previous entry.
    pub fn put(&self, key: &str, value: V) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    pub fn put_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        self.insert(key, value, Instant::now(), ttl);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read(HashMap::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, key: &str, value: V, fetched_at: Instant, ttl: Duration) {
        let entry = CacheEntry {
            value,
            fetched_at,
            fetched_at_utc: Utc::now(),
            ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), entry);
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<String, CacheEntry<V>>) -> R) -> R {
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Backdates an entry so staleness can be exercised without sleeping.
    #[cfg(test)]
    pub(crate) fn put_aged(&self, key: &str, value: V, age: Duration) {
        let fetched_at = Instant::now()
            .checked_sub(age)
            .unwrap_or_else(Instant::now);
        self.insert(key, value, fetched_at, self.default_ttl);
    }
}
