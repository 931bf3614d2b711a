//! Error types for the fetch cache
//!
//! `CacheError` covers the cache store and the admin API, `FetchError` covers
//! per-request fetch failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Error type for cache store operations and the admin API.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// A fetch routed through the interceptor failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

// == Fetch Error Enum ==
/// Failure of a single fetch request.
///
/// Cloneable so that every caller joined to an in-flight fetch receives the
/// exact error the owning fetch produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The network operation failed or timed out
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The entity rejected the payload
    #[error("Failed to apply payload: {0}")]
    Apply(String),

    /// The owning fetch went away without publishing an outcome
    #[error("In-flight fetch for '{0}' was abandoned")]
    Abandoned(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::CacheFull(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            CacheError::Fetch(err @ FetchError::Transport(_)) => {
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            CacheError::Fetch(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result of a single fetch request.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_converts_into_cache_error() {
        let err: CacheError = FetchError::Transport("connection reset".to_string()).into();
        assert!(matches!(err, CacheError::Fetch(FetchError::Transport(_))));
        assert_eq!(err.to_string(), "Transport failure: connection reset");
    }

    #[test]
    fn test_transport_failure_maps_to_bad_gateway() {
        let response =
            CacheError::Fetch(FetchError::Transport("timeout".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let response = CacheError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
