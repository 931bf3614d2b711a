//! API Handlers
//!
//! HTTP request handlers for the fetch proxy and cache administration.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::entity::{Document, EntityDescriptor};
use crate::error::{CacheError, Result};
use crate::fetch::FetchCache;
use crate::models::{
    ConfigRequest, ConfigResponse, FetchQuery, FetchResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, StatsResponse,
};
use crate::transport::Transport;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The interceptor every proxied fetch goes through
    pub cache: Arc<FetchCache>,
}

impl AppState {
    pub fn new(cache: FetchCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self::new(FetchCache::from_config(config, transport))
    }
}

/// Handler for GET /fetch/*path
///
/// Fetches `/{path}` from upstream through the interceptor. Fetch options
/// come from the query string, the remaining parameters are forwarded.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(raw): Query<BTreeMap<String, String>>,
) -> Result<Json<FetchResponse>> {
    let query = FetchQuery::from_params(raw).map_err(CacheError::InvalidRequest)?;

    let mut descriptor = EntityDescriptor::collection(format!("/{}", path.trim_start_matches('/')));
    descriptor.params = query.params;

    let mut document = Document::new(descriptor);
    let outcome = state.cache.fetch(&mut document, &query.options).await?;

    Ok(Json(FetchResponse {
        key: outcome.key,
        source: outcome.source,
        payload: document.into_data().unwrap_or(Value::Null),
    }))
}

/// Handler for POST /cache/invalidate
///
/// Removes one entry by key, or every entry under a key prefix.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = match (req.key, req.prefix) {
        (Some(key), _) => usize::from(state.cache.invalidate(&key).await),
        (None, Some(prefix)) => state.cache.invalidate_prefix(&prefix).await,
        (None, None) => 0,
    };

    Ok(Json(InvalidateResponse { removed }))
}

/// Handler for DELETE /cache
///
/// Drops every cached response.
pub async fn clear_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let removed = state.cache.clear().await;
    info!(removed, "Cache cleared");
    Json(InvalidateResponse { removed })
}

/// Handler for PUT /config
///
/// Toggles the global enable flag.
pub async fn config_handler(
    State(state): State<AppState>,
    Json(req): Json<ConfigRequest>,
) -> Json<ConfigResponse> {
    state.cache.set_enabled(req.enabled);
    info!(enabled = req.enabled, "Cache enable flag updated");
    Json(ConfigResponse {
        enabled: state.cache.is_enabled(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.cache_stats().await;

    Json(StatsResponse::new(
        state.cache.is_enabled(),
        state.cache.pending().len(),
        cache,
        state.cache.stats(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchResult;
    use crate::fetch::FetchSource;
    use crate::transport::FetchRequest;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn fetch(&self, request: &FetchRequest) -> FetchResult<Value> {
            Ok(json!({"url": request.url, "params": request.params}))
        }
    }

    fn state() -> AppState {
        AppState::new(FetchCache::new(Arc::new(EchoTransport)))
    }

    fn query(pairs: &[(&str, &str)]) -> Query<BTreeMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_fetch_handler_caches_on_request() {
        let state = state();
        let path = || Path("agents".to_string());

        let first = fetch_handler(State(state.clone()), path(), query(&[("cache", "true")]))
            .await
            .unwrap();
        let second = fetch_handler(State(state.clone()), path(), query(&[("cache", "true")]))
            .await
            .unwrap();

        assert_eq!(first.source, FetchSource::Network);
        assert_eq!(second.source, FetchSource::Cache);
        assert_eq!(second.key.as_deref(), Some("/agents"));
        assert_eq!(second.payload["url"], "/agents");
    }

    #[tokio::test]
    async fn test_fetch_handler_forwards_params() {
        let response = fetch_handler(
            State(state()),
            Path("agents".to_string()),
            query(&[("page", "2")]),
        )
        .await
        .unwrap();

        assert_eq!(response.source, FetchSource::Network);
        assert!(response.key.is_none());
        assert_eq!(response.payload["params"]["page"], "2");
    }

    #[tokio::test]
    async fn test_fetch_handler_rejects_bad_options() {
        let result = fetch_handler(
            State(state()),
            Path("agents".to_string()),
            query(&[("expires", "never")]),
        )
        .await;

        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_invalidate_handler_by_prefix() {
        let state = state();
        for path in ["agents", "agents/7"] {
            fetch_handler(
                State(state.clone()),
                Path(path.to_string()),
                query(&[("cache", "true")]),
            )
            .await
            .unwrap();
        }

        let req = InvalidateRequest {
            key: None,
            prefix: Some("/agents".to_string()),
        };
        let response = invalidate_handler(State(state.clone()), Json(req)).await.unwrap();

        assert_eq!(response.removed, 2);
        assert_eq!(state.cache.cache_stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_invalidate_handler_requires_target() {
        let req = InvalidateRequest {
            key: None,
            prefix: None,
        };
        let result = invalidate_handler(State(state()), Json(req)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_handler_toggles_enabled() {
        let state = state();

        let response =
            config_handler(State(state.clone()), Json(ConfigRequest { enabled: false })).await;

        assert!(!response.enabled);
        assert!(!state.cache.is_enabled());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let response = stats_handler(State(state())).await;
        assert!(response.enabled);
        assert_eq!(response.pending, 0);
        assert_eq!(response.cache.hits, 0);
        assert_eq!(response.fetch.requests, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
