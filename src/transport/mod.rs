//! Transport Module
//!
//! The network side of a fetch. The cache only needs "issue this request,
//! eventually give me a payload or a failure".

mod http;

pub use http::HttpTransport;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::entity::EntityDescriptor;
use crate::error::FetchResult;

/// A network request for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Resource URL, absolute or relative to the transport's base
    pub url: String,
    /// Query parameters
    pub params: BTreeMap<String, String>,
}

impl FetchRequest {
    pub fn from_descriptor(descriptor: &EntityDescriptor) -> Self {
        Self {
            url: descriptor.resource_url(),
            params: descriptor.params.clone(),
        }
    }
}

/// Issues fetches over the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request, returning the raw server payload.
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<Value>;
}
