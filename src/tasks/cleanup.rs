//! Expiry Sweep Task
//!
//! Background task that periodically drops stale cache entries, so entries
//! nobody asks for again do not linger until evicted.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCacheStore;

/// Spawns a background task that prunes expired entries every
/// `cleanup_interval_secs` seconds.
///
/// Returns the task's JoinHandle so it can be aborted on shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::new(1000, None)));
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: SharedCacheStore, cleanup_interval_secs: u64) -> JoinHandle<()> {
    spawn_cleanup_task_every(store, Duration::from_secs(cleanup_interval_secs))
}

/// Like [`spawn_cleanup_task`], with a sub-second interval.
pub fn spawn_cleanup_task_every(store: SharedCacheStore, interval: Duration) -> JoinHandle<()> {
    // A zero interval would spin on the store lock.
    let interval = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        info!(?interval, "Starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.write().await.prune_expired();

            if removed > 0 {
                info!("Expiry sweep: removed {} stale entries", removed);
            } else {
                debug!("Expiry sweep: no stale entries found");
            }
        }
    })
}
