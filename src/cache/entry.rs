//! Cache Entry Module
//!
//! Defines the structure for cached server payloads with optional expiry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// The last successfully received payload for a cache key.
///
/// Entries are never mutated in place; a fresh fetch replaces them outright.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cache key this entry was stored under
    pub key: String,
    /// The server payload as last received
    pub value: Value,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Maximum age before the entry is stale, None = never expires
    pub expires: Option<Duration>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(key: impl Into<String>, value: Value, expires: Option<Duration>) -> Self {
        Self {
            key: key.into(),
            value,
            stored_at: current_timestamp_ms(),
            expires,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.stored_at)
    }

    // == Is Expired ==
    /// Checks if the entry has gone stale.
    ///
    /// An entry is stale once its age strictly exceeds `expires`. Entries
    /// without `expires` never go stale by time alone.
    pub fn is_expired(&self) -> bool {
        match self.expires {
            Some(expires) => u128::from(self.age_ms()) > expires.as_millis(),
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, or None if no expiry is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry is still fresh
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires.map(|expires| {
            let limit = u64::try_from(expires.as_millis()).unwrap_or(u64::MAX);
            limit.saturating_sub(self.age_ms())
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
