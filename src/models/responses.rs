//! Response DTOs for the fetch cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::fetch::{FetchSource, FetchStats};

/// Response body for `GET /fetch/*path`
#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    /// Cache key, absent when the cache was bypassed
    pub key: Option<String>,
    pub source: FetchSource,
    /// The payload the fetch synced
    pub payload: Value,
}

/// Response body for `POST /cache/invalidate` and `DELETE /cache`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of entries removed
    pub removed: usize,
}

/// Response body for `PUT /config`
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub enabled: bool,
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub enabled: bool,
    /// Keys with a fetch currently in flight
    pub pending: usize,
    /// Cache hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub cache: CacheStats,
    pub fetch: FetchStats,
}

impl StatsResponse {
    pub fn new(enabled: bool, pending: usize, cache: CacheStats, fetch: FetchStats) -> Self {
        Self {
            enabled,
            pending,
            hit_rate: cache.hit_rate(),
            cache,
            fetch,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
