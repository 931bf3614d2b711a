//! HTTP transport backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FetchError, FetchResult};
use crate::transport::{FetchRequest, Transport};

/// Fetches JSON payloads from an upstream HTTP server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport resolving relative URLs against `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> FetchResult<Self> {
        Self::new(
            config.upstream_url.clone(),
            Duration::from_secs(config.request_timeout),
        )
    }

    /// Absolute URL for a request.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<Value> {
        let url = self.resolve(&request.url);
        debug!(%url, "Fetching upstream");

        let response = self
            .client
            .get(&url)
            .query(&request.params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                warn!(%url, error = %e, "Upstream fetch failed");
                FetchError::Transport(e.to_string())
            })?;

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Transport(format!("Invalid JSON from {url}: {e}")))
    }
}
