//! Per-request fetch options.

use std::time::Duration;

/// Options recognized on a single fetch.
///
/// Requests bypass the cache unless `cache` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Opt this request into reading and populating the cache
    pub cache: bool,
    /// Overrides the derived cache key outright
    pub cache_key: Option<String>,
    /// Maximum age of the entry this request stores
    pub expires: Option<Duration>,
    /// Drop stale entries under the entity's URL before looking up
    pub prune: bool,
}

impl FetchOptions {
    /// Options that bypass the cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that opt into the cache.
    pub fn cached() -> Self {
        Self {
            cache: true,
            ..Self::default()
        }
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn with_expires(mut self, expires: Duration) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_prune(mut self) -> Self {
        self.prune = true;
        self
    }
}
