//! Entity Module
//!
//! The data-fetching entities the cache sits in front of. An entity knows
//! which remote resource it mirrors, how to absorb a server payload, and
//! carries the signal observers interested in its fetches.

mod document;

pub use document::Document;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::FetchResult;
use crate::fetch::Signals;

// == Entity Kind ==
/// Whether an entity mirrors a single record or a collection of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Record,
    Collection,
}

// == Entity Descriptor ==
/// Identifies the remote resource an entity mirrors.
///
/// Only ever read by key derivation and the transport; never mutated by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    /// Resolved resource URL
    pub url: String,
    pub kind: EntityKind,
    /// Record identifier, if the entity is a persisted record
    pub id: Option<String>,
    /// Entity-level query parameters, kept sorted for stable keys
    pub params: BTreeMap<String, String>,
}

impl EntityDescriptor {
    /// Describes a collection living at `url`.
    pub fn collection(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: EntityKind::Collection,
            id: None,
            params: BTreeMap::new(),
        }
    }

    /// Describes a record living under `url`.
    pub fn record(url: impl Into<String>, id: Option<String>) -> Self {
        Self {
            url: url.into(),
            kind: EntityKind::Record,
            id,
            params: BTreeMap::new(),
        }
    }

    /// Adds a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The URL of the exact resource, with a record's id appended when the
    /// base URL does not already end in it.
    pub fn resource_url(&self) -> String {
        match &self.id {
            Some(id) if self.kind == EntityKind::Record => {
                let base = self.url.trim_end_matches('/');
                if base.ends_with(&format!("/{id}")) {
                    base.to_string()
                } else {
                    format!("{base}/{id}")
                }
            }
            _ => self.url.clone(),
        }
    }
}

// == Entity Trait ==
/// A model or collection whose data can be fetched through the cache.
pub trait Entity: Send {
    /// What this entity fetches.
    fn descriptor(&self) -> EntityDescriptor;

    /// Absorbs a server payload, whether it came from the network or the cache.
    fn apply(&mut self, payload: &Value) -> FetchResult<()>;

    /// Observers notified about this entity's fetch lifecycle.
    fn signals(&self) -> &Signals;
}
