//! Request DTOs for the fetch cache API
//!
//! Defines the structure of incoming HTTP requests.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::fetch::FetchOptions;

/// Query string of `GET /fetch/*path`.
///
/// `cache`, `expires` (seconds), `cache_key` and `prune` configure the
/// fetch; every other parameter is forwarded upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchQuery {
    pub options: FetchOptions,
    pub params: BTreeMap<String, String>,
}

impl FetchQuery {
    /// Splits raw query parameters into fetch options and upstream params.
    ///
    /// Returns an error message if an option has an unparseable value.
    pub fn from_params(mut raw: BTreeMap<String, String>) -> Result<Self, String> {
        let mut options = FetchOptions::new();

        if let Some(cache) = raw.remove("cache") {
            options.cache = parse_flag("cache", &cache)?;
        }
        if let Some(prune) = raw.remove("prune") {
            options.prune = parse_flag("prune", &prune)?;
        }
        if let Some(expires) = raw.remove("expires") {
            let secs: u64 = expires
                .parse()
                .map_err(|_| format!("expires must be a number of seconds, got '{expires}'"))?;
            options.expires = Some(Duration::from_secs(secs));
        }
        if let Some(key) = raw.remove("cache_key") {
            if key.is_empty() {
                return Err("cache_key cannot be empty".to_string());
            }
            options.cache_key = Some(key);
        }

        Ok(Self {
            options,
            params: raw,
        })
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, String> {
    match value {
        "" | "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(format!("{name} must be true or false, got '{other}'")),
    }
}

/// Request body for `POST /cache/invalidate`
///
/// Exactly one of `key` or `prefix` must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

impl InvalidateRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match (&self.key, &self.prefix) {
            (Some(_), Some(_)) => Some("Give either key or prefix, not both".to_string()),
            (None, None) => Some("One of key or prefix is required".to_string()),
            (Some(key), None) if key.is_empty() => Some("Key cannot be empty".to_string()),
            _ => None,
        }
    }
}

/// Request body for `PUT /config`
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigRequest {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fetch_query_splits_options_from_params() {
        let query = FetchQuery::from_params(raw(&[
            ("cache", "true"),
            ("expires", "30"),
            ("page", "2"),
        ]))
        .unwrap();

        assert!(query.options.cache);
        assert_eq!(query.options.expires, Some(Duration::from_secs(30)));
        assert_eq!(query.params, raw(&[("page", "2")]));
    }

    #[test]
    fn test_fetch_query_defaults_to_uncached() {
        let query = FetchQuery::from_params(BTreeMap::new()).unwrap();
        assert_eq!(query.options, FetchOptions::new());
    }

    #[test]
    fn test_fetch_query_bare_flag() {
        let query = FetchQuery::from_params(raw(&[("cache", ""), ("prune", "1")])).unwrap();
        assert!(query.options.cache);
        assert!(query.options.prune);
    }

    #[test]
    fn test_fetch_query_rejects_bad_values() {
        assert!(FetchQuery::from_params(raw(&[("cache", "maybe")])).is_err());
        assert!(FetchQuery::from_params(raw(&[("expires", "soon")])).is_err());
        assert!(FetchQuery::from_params(raw(&[("cache_key", "")])).is_err());
    }

    #[test]
    fn test_invalidate_request_deserialize() {
        let req: InvalidateRequest = serde_json::from_str(r#"{"prefix": "/agents"}"#).unwrap();
        assert_eq!(req.prefix.as_deref(), Some("/agents"));
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_invalidate_request_validation() {
        let both = InvalidateRequest {
            key: Some("a".to_string()),
            prefix: Some("b".to_string()),
        };
        let neither = InvalidateRequest {
            key: None,
            prefix: None,
        };

        assert!(both.validate().is_some());
        assert!(neither.validate().is_some());
    }
}
