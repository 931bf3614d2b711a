//! Cache key derivation.
//!
//! The interceptor calls whatever [`KeyGenerator`] it was built with, so a
//! caller holding the same generator can pre-compute or instrument keys.

use crate::entity::EntityDescriptor;
use crate::fetch::FetchOptions;

/// Maps a fetch onto the key identifying its remote resource.
///
/// Implementations must be deterministic and side-effect free.
pub trait KeyGenerator: Send + Sync {
    fn derive_key(&self, entity: &EntityDescriptor, options: &FetchOptions) -> String;
}

/// Keys a fetch by its resource URL plus its sorted query parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlKeyGenerator;

impl KeyGenerator for UrlKeyGenerator {
    fn derive_key(&self, entity: &EntityDescriptor, options: &FetchOptions) -> String {
        derive_key(entity, options)
    }
}

/// Derives the default cache key.
///
/// A `cache_key` option wins outright. Otherwise the key is the resource URL
/// followed by the query parameters in key order, e.g. `/agents?page=2`.
pub fn derive_key(entity: &EntityDescriptor, options: &FetchOptions) -> String {
    if let Some(key) = &options.cache_key {
        return key.clone();
    }

    let mut key = entity.resource_url();
    if entity.params.is_empty() {
        return key;
    }

    key.push(if key.contains('?') { '&' } else { '?' });
    let query: Vec<String> = entity
        .params
        .iter()
        .map(|(name, value)| format!("{}={}", escape(name), escape(value)))
        .collect();
    key.push_str(&query.join("&"));
    key
}

// Separators inside names and values must not read as separators.
fn escape(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    for ch in component.chars() {
        match ch {
            '%' => escaped.push_str("%25"),
            '&' => escaped.push_str("%26"),
            '=' => escaped.push_str("%3D"),
            '?' => escaped.push_str("%3F"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
