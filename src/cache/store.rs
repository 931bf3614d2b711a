//! Cache Store Module
//!
//! Response storage combining a HashMap with LRU tracking and per-entry expiry.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_KEY_LENGTH};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Response cache with size-bounded LRU eviction and expiry.
///
/// At most one entry exists per key. Lookups never return stale entries.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Expiry applied to entries stored without one
    default_expires: Option<Duration>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the cache can hold
    /// * `default_expires` - Expiry for entries stored without one, None = never
    pub fn new(max_entries: usize, default_expires: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            default_expires,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_entries, config.default_expires())
    }

    // == Get ==
    /// Returns the fresh entry for `key`, if any.
    ///
    /// Stale entries are dropped on sight and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            debug!(key, "Dropping stale cache entry");
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).cloned()
    }

    // == Peek ==
    /// Looks at an entry without touching recency, stats, or expiry.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// If the cache is at capacity, the least recently used entry is evicted.
    ///
    /// # Arguments
    /// * `key` - The cache key
    /// * `value` - The server payload
    /// * `expires` - Maximum age (uses `default_expires` if None)
    pub fn set(&mut self, key: String, value: Value, expires: Option<Duration>) -> Result<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        let is_overwrite = self.entries.contains_key(&key);
        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted_key) => {
                    debug!(key = %evicted_key, "Evicting least recently used entry");
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(CacheError::CacheFull(
                        "Cache is full and eviction failed".to_string(),
                    ));
                }
            }
        }

        let entry = CacheEntry::new(key.clone(), value, expires.or(self.default_expires));
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Invalidate ==
    /// Removes the entry for `key`. Returns whether one existed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.stats.record_invalidations(1);
        }
        removed
    }

    /// Removes every entry whose key satisfies `predicate`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_matching<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let count = self.remove_where(|key, _| predicate(key));
        self.stats.record_invalidations(count);
        count
    }

    /// Removes every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        self.invalidate_matching(|key| key.starts_with(prefix))
    }

    // == Prune ==
    /// Removes all stale entries. Returns the number removed.
    pub fn prune_expired(&mut self) -> usize {
        self.prune_expired_matching(|_| true)
    }

    /// Removes stale entries whose key satisfies `predicate`.
    pub fn prune_expired_matching<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let count = self.remove_where(|key, entry| entry.is_expired() && predicate(key));
        self.stats.record_expirations(count);
        count
    }

    // == Clear ==
    /// Removes all entries. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    /// Removes all entries and zeroes the statistics.
    pub fn reset(&mut self) {
        self.clear();
        self.stats = CacheStats::new();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns all stored keys, stale ones included, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    fn remove_where<F>(&mut self, matches: F) -> usize
    where
        F: Fn(&str, &CacheEntry) -> bool,
    {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| matches(key, entry))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.set_total_entries(self.entries.len());
        doomed.len()
    }
}
