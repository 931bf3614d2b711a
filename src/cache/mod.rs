//! Cache Module
//!
//! In-memory storage of server payloads with expiry and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;

use std::sync::Arc;

use tokio::sync::RwLock;

/// Cache store shared between the interceptor, background tasks and the API.
pub type SharedCacheStore = Arc<RwLock<CacheStore>>;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 2048;
