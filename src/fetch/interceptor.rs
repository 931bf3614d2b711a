//! Fetch interceptor.
//!
//! Decides, per fetch, between a plain network call, a cache hit, owning a
//! new network call, or joining one already in flight.
//!
//! ```text
//! START ─┬─ disabled / no `cache` ──────────────► network ─► request, sync
//!        ├─ fresh entry ────────────────────────► cache   ─► cachesync, sync
//!        ├─ miss, key free   (owner) ───────────► network ─► request, sync
//!        └─ miss, key in flight (joiner) ───────► owner's outcome ─► sync
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{oneshot, RwLock};
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore, SharedCacheStore};
use crate::config::Config;
use crate::entity::{Entity, EntityDescriptor};
use crate::error::FetchResult;
use crate::fetch::{
    Claim, FetchOptions, FlightHandle, FlightSubscription, KeyGenerator, PendingRegistry, Signal,
    UrlKeyGenerator,
};
use crate::transport::{FetchRequest, Transport};

// == Config ==
/// Interceptor settings. `enabled` is the value `reset` restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterceptorConfig {
    /// When false every fetch is a plain network fetch
    pub enabled: bool,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// == Outcome ==
/// Where a successful fetch got its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    /// This request issued the network call
    Network,
    /// Served from a cached entry
    Cache,
    /// Shared another caller's in-flight network call
    Joined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub source: FetchSource,
    /// Cache key, when the request consulted the cache
    pub key: Option<String>,
}

// == Stats ==
/// Snapshot of interceptor counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// Network calls issued
    pub requests: u64,
    /// Fetches served from the cache
    pub cache_syncs: u64,
    /// Fetches that joined an in-flight call
    pub joins: u64,
    /// Fetches that settled with an error
    pub failures: u64,
}

#[derive(Debug, Default)]
struct FetchCounters {
    requests: AtomicU64,
    cache_syncs: AtomicU64,
    joins: AtomicU64,
    failures: AtomicU64,
}

impl FetchCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FetchStats {
        FetchStats {
            requests: self.requests.load(Ordering::Relaxed),
            cache_syncs: self.cache_syncs.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        for counter in [&self.requests, &self.cache_syncs, &self.joins, &self.failures] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

enum Admission {
    Hit(Value),
    Owner(FlightHandle),
    Joiner(FlightSubscription),
}

// A fetched payload awaiting the owner's apply; nothing is cached until the
// owner answers on `verdict`.
struct Review {
    payload: Value,
    verdict: oneshot::Sender<bool>,
}

// == Fetch Cache ==
/// Response cache and request deduplication in front of a [`Transport`].
pub struct FetchCache {
    store: SharedCacheStore,
    pending: PendingRegistry,
    transport: Arc<dyn Transport>,
    keys: Arc<dyn KeyGenerator>,
    config: InterceptorConfig,
    enabled: AtomicBool,
    counters: FetchCounters,
}

impl FetchCache {
    /// Creates an interceptor with an unbounded-by-time store of 1000 entries.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_store(
            transport,
            Arc::new(RwLock::new(CacheStore::new(1000, None))),
        )
    }

    pub fn with_store(transport: Arc<dyn Transport>, store: SharedCacheStore) -> Self {
        let config = InterceptorConfig::default();
        Self {
            store,
            pending: PendingRegistry::new(),
            transport,
            keys: Arc::new(UrlKeyGenerator),
            config,
            enabled: AtomicBool::new(config.enabled),
            counters: FetchCounters::default(),
        }
    }

    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let store = Arc::new(RwLock::new(CacheStore::from_config(config)));
        Self::with_store(transport, store).with_config(InterceptorConfig {
            enabled: config.enabled,
        })
    }

    /// Replaces the key generator used for every cache-consulting fetch.
    pub fn with_key_generator(mut self, keys: Arc<dyn KeyGenerator>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_config(mut self, config: InterceptorConfig) -> Self {
        self.config = config;
        self.enabled = AtomicBool::new(config.enabled);
        self
    }

    // == Fetch ==
    /// Fetches `entity`, from the cache when possible.
    ///
    /// On success the entity has absorbed the payload and its observers saw
    /// `request` or `cachesync` (never both, at most one) followed by `sync`.
    /// On failure no `sync` is emitted and nothing is cached.
    pub async fn fetch<E>(
        &self,
        entity: &mut E,
        options: &FetchOptions,
    ) -> FetchResult<FetchOutcome>
    where
        E: Entity + ?Sized,
    {
        let descriptor = entity.descriptor();
        if !self.is_enabled() || !options.cache {
            return self.fetch_direct(entity, &descriptor).await;
        }

        let key = self.keys.derive_key(&descriptor, options);
        match self.admit(&descriptor, &key, options).await {
            Admission::Hit(payload) => {
                debug!(%key, "Cache hit");
                if let Err(e) = entity.apply(&payload) {
                    warn!(%key, error = %e, "Cached payload rejected, dropping entry");
                    self.store.write().await.invalidate(&key);
                    self.record_failure();
                    return Err(e);
                }
                FetchCounters::bump(&self.counters.cache_syncs);
                entity.signals().emit(Signal::CacheSync, Some(&key));
                entity.signals().emit(Signal::Sync, Some(&key));
                Ok(FetchOutcome {
                    source: FetchSource::Cache,
                    key: Some(key),
                })
            }
            Admission::Owner(handle) => {
                debug!(%key, "Cache miss, fetching");
                FetchCounters::bump(&self.counters.requests);
                entity.signals().emit(Signal::Request, Some(&key));
                let request = FetchRequest::from_descriptor(&descriptor);
                let (flight, review) = self.launch(handle, request, options.expires);
                self.settle_owner(entity, key, flight, review).await
            }
            Admission::Joiner(flight) => {
                debug!(%key, "Joining in-flight fetch");
                FetchCounters::bump(&self.counters.joins);
                let outcome = flight.outcome().await;
                self.settle(entity, key, outcome, FetchSource::Joined)
            }
        }
    }

    // Lookup and claim happen under the store lock, so two requests for the
    // same key can never both become owners.
    async fn admit(
        &self,
        descriptor: &EntityDescriptor,
        key: &str,
        options: &FetchOptions,
    ) -> Admission {
        let mut store = self.store.write().await;

        if options.prune {
            let url = descriptor.resource_url();
            let pruned = store.prune_expired_matching(|k| is_under_url(k, &url));
            if pruned > 0 {
                debug!(%url, pruned, "Pruned stale entries");
            }
        }

        if let Some(entry) = store.get(key) {
            return Admission::Hit(entry.value);
        }

        match self.pending.claim_or_join(key) {
            Claim::Owner(handle) => Admission::Owner(handle),
            Claim::Joiner(subscription) => Admission::Joiner(subscription),
        }
    }

    // The network call runs detached from the owner's caller; dropping the
    // caller does not cancel it. The payload is cached only once the owner
    // applied it, and before the key is released.
    fn launch(
        &self,
        handle: FlightHandle,
        request: FetchRequest,
        expires: Option<Duration>,
    ) -> (FlightSubscription, oneshot::Receiver<Review>) {
        let subscription = handle.subscribe();
        let (review_tx, review_rx) = oneshot::channel();
        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            let outcome = transport.fetch(&request).await;
            if let Ok(payload) = &outcome {
                let (verdict, accepted) = oneshot::channel();
                let review = Review {
                    payload: payload.clone(),
                    verdict,
                };
                let cacheable = match review_tx.send(review) {
                    Ok(()) => accepted.await.unwrap_or(false),
                    // Owner is gone; cache only if nobody is left to apply it.
                    Err(_) => handle.waiting() == 0,
                };

                let key = handle.key().to_string();
                if !cacheable {
                    debug!(%key, "Payload not applied, not caching");
                } else if let Err(e) = store.write().await.set(key, payload.clone(), expires) {
                    warn!(key = handle.key(), error = %e, "Response not cached");
                }
            }
            handle.complete(outcome);
        });

        (subscription, review_rx)
    }

    async fn settle_owner<E>(
        &self,
        entity: &mut E,
        key: String,
        flight: FlightSubscription,
        review: oneshot::Receiver<Review>,
    ) -> FetchResult<FetchOutcome>
    where
        E: Entity + ?Sized,
    {
        // No review means the transport failed or the flight died.
        let Ok(Review { payload, verdict }) = review.await else {
            let outcome = flight.outcome().await;
            return self.settle(entity, key, outcome, FetchSource::Network);
        };

        let applied = entity.apply(&payload);
        // A closed channel only means the flight is gone.
        let _ = verdict.send(applied.is_ok());
        applied.inspect_err(|e| {
            warn!(%key, error = %e, "Payload rejected, not caching");
            self.record_failure();
        })?;

        // Resolves once the payload is stored and the key released.
        let _ = flight.outcome().await;
        entity.signals().emit(Signal::Sync, Some(&key));
        Ok(FetchOutcome {
            source: FetchSource::Network,
            key: Some(key),
        })
    }

    fn settle<E>(
        &self,
        entity: &mut E,
        key: String,
        outcome: FetchResult<Value>,
        source: FetchSource,
    ) -> FetchResult<FetchOutcome>
    where
        E: Entity + ?Sized,
    {
        let payload = outcome.inspect_err(|e| {
            warn!(%key, error = %e, "Fetch failed");
            self.record_failure();
        })?;

        entity.apply(&payload).inspect_err(|_| self.record_failure())?;
        entity.signals().emit(Signal::Sync, Some(&key));
        Ok(FetchOutcome {
            source,
            key: Some(key),
        })
    }

    async fn fetch_direct<E>(
        &self,
        entity: &mut E,
        descriptor: &EntityDescriptor,
    ) -> FetchResult<FetchOutcome>
    where
        E: Entity + ?Sized,
    {
        FetchCounters::bump(&self.counters.requests);
        entity.signals().emit(Signal::Request, None);

        let payload = self
            .transport
            .fetch(&FetchRequest::from_descriptor(descriptor))
            .await
            .inspect_err(|e| {
                warn!(url = %descriptor.url, error = %e, "Fetch failed");
                self.record_failure();
            })?;

        entity.apply(&payload).inspect_err(|_| self.record_failure())?;
        entity.signals().emit(Signal::Sync, None);
        Ok(FetchOutcome {
            source: FetchSource::Network,
            key: None,
        })
    }

    fn record_failure(&self) {
        FetchCounters::bump(&self.counters.failures);
    }

    // == Key Derivation ==
    /// The key `fetch` would use for this entity and options.
    pub fn derive_key<E>(&self, entity: &E, options: &FetchOptions) -> String
    where
        E: Entity + ?Sized,
    {
        self.keys.derive_key(&entity.descriptor(), options)
    }

    // == Configuration ==
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turns the cache on or off for all subsequent fetches.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Empties the cache, zeroes statistics and restores the configured
    /// `enabled` value. Fetches already in flight are unaffected.
    pub async fn reset(&self) {
        self.store.write().await.reset();
        self.counters.reset();
        self.set_enabled(self.config.enabled);
    }

    // == Cache Management ==
    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.write().await.invalidate(key)
    }

    pub async fn invalidate_matching<F>(&self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.store.write().await.invalidate_matching(predicate)
    }

    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.store.write().await.invalidate_prefix(prefix)
    }

    /// Removes every entry. Returns how many there were.
    pub async fn clear(&self) -> usize {
        let mut store = self.store.write().await;
        let removed = store.len();
        store.clear();
        removed
    }

    // == Inspection ==
    pub fn store(&self) -> SharedCacheStore {
        Arc::clone(&self.store)
    }

    pub fn pending(&self) -> &PendingRegistry {
        &self.pending
    }

    pub fn stats(&self) -> FetchStats {
        self.counters.snapshot()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}

// Whether `key` names the resource at `url` or something beneath it.
fn is_under_url(key: &str, url: &str) -> bool {
    key.strip_prefix(url)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '&']))
}
