//! Fetch Cache - response caching and request deduplication for entity fetches
//!
//! Sits between data-fetching entities and the network: a fetch is answered
//! from a cached response, sent to the network, or attached to an identical
//! fetch already in flight.

pub mod api;
pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod fetch;
pub mod models;
pub mod tasks;
pub mod transport;

pub use api::AppState;
pub use config::Config;
pub use entity::{Document, Entity, EntityDescriptor, EntityKind};
pub use error::{CacheError, FetchError};
pub use fetch::{FetchCache, FetchOptions, FetchOutcome, FetchSource, Signal, Signals};
pub use tasks::spawn_cleanup_task;
pub use transport::{FetchRequest, HttpTransport, Transport};
