//! Configuration Module
//!
//! Handles loading and managing fetch cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Fetch cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Global switch; when false every fetch goes straight to the network
    pub enabled: bool,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Expiry in seconds for entries stored without an explicit `expires`, 0 = never
    pub default_expires: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL upstream fetches are resolved against
    pub upstream_url: String,
    /// Upstream request timeout in seconds
    pub request_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - Global enable flag (default: true)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_EXPIRES` - Default expiry in seconds, 0 disables (default: 0)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Upstream base URL (default: http://127.0.0.1:8080)
    /// - `REQUEST_TIMEOUT` - Upstream timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: parse_var("CACHE_ENABLED").unwrap_or(defaults.enabled),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_expires: parse_var("DEFAULT_EXPIRES").unwrap_or(defaults.default_expires),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            request_timeout: parse_var("REQUEST_TIMEOUT").unwrap_or(defaults.request_timeout),
        }
    }

    /// Default expiry as a Duration, `None` when entries never expire by default.
    pub fn default_expires(&self) -> Option<Duration> {
        (self.default_expires > 0).then(|| Duration::from_secs(self.default_expires))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1000,
            default_expires: 0,
            cleanup_interval: 1,
            server_port: 3000,
            upstream_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: 30,
        }
    }
}
