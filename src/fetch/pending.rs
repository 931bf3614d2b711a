//! In-flight fetch registry.
//!
//! At most one fetch runs per cache key. The first caller claims the key and
//! receives a [`FlightHandle`]; everyone arriving before the flight settles
//! receives a [`FlightSubscription`] to its outcome instead.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// What every caller attached to a flight eventually observes.
pub type FlightOutcome = FetchResult<Value>;

type OutcomeReceiver = watch::Receiver<Option<FlightOutcome>>;

#[derive(Debug)]
struct Flight {
    id: u64,
    outcome: OutcomeReceiver,
}

/// Result of asking for a key.
#[derive(Debug)]
pub enum Claim {
    /// The caller now owns the key and must settle it
    Owner(FlightHandle),
    /// Someone else owns the key; wait for their outcome
    Joiner(FlightSubscription),
}

// == Pending Registry ==
/// Tracks in-flight fetches by cache key.
///
/// Cheap to clone; clones share the same set of flights. The lock is only
/// held for map operations, never across an await.
#[derive(Debug, Clone, Default)]
pub struct PendingRegistry {
    flights: Arc<Mutex<HashMap<String, Flight>>>,
    next_id: Arc<AtomicU64>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Try Claim ==
    /// Registers `key` as in flight, unless it already is.
    pub fn try_claim(&self, key: &str) -> Option<FlightHandle> {
        let mut flights = self.lock();
        if flights.contains_key(key) {
            return None;
        }
        Some(self.claim_locked(&mut flights, key))
    }

    // == Join ==
    /// Subscribes to the outcome of the flight for `key`, if one is running.
    pub fn join(&self, key: &str) -> Option<FlightSubscription> {
        self.lock().get(key).map(|flight| FlightSubscription {
            key: key.to_string(),
            outcome: flight.outcome.clone(),
        })
    }

    /// Claims `key` or joins its flight, as a single atomic step.
    pub fn claim_or_join(&self, key: &str) -> Claim {
        let mut flights = self.lock();
        match flights.get(key) {
            Some(flight) => Claim::Joiner(FlightSubscription {
                key: key.to_string(),
                outcome: flight.outcome.clone(),
            }),
            None => Claim::Owner(self.claim_locked(&mut flights, key)),
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of keys currently in flight.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn claim_locked(&self, flights: &mut HashMap<String, Flight>, key: &str) -> FlightHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, outcome) = watch::channel(None);
        flights.insert(key.to_string(), Flight { id, outcome });
        debug!(key, flight = id, "Claimed pending fetch");

        FlightHandle {
            key: key.to_string(),
            id,
            sender,
            registry: self.clone(),
            released: false,
        }
    }

    // == Release ==
    // Only the flight that registered the slot may clear it.
    fn release(&self, key: &str, id: u64) -> bool {
        let mut flights = self.lock();
        if flights.get(key).is_some_and(|flight| flight.id == id) {
            flights.remove(key);
            debug!(key, flight = id, "Released pending fetch");
            true
        } else {
            false
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Flight>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Flight Handle ==
/// Ownership of an in-flight key.
///
/// Settled exactly once: either [`complete`](Self::complete) publishes an
/// outcome, or dropping the handle releases the key and subscribers observe
/// [`FetchError::Abandoned`].
#[derive(Debug)]
pub struct FlightHandle {
    key: String,
    id: u64,
    sender: watch::Sender<Option<FlightOutcome>>,
    registry: PendingRegistry,
    released: bool,
}

impl FlightHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// A subscription for the owner's own use.
    pub fn subscribe(&self) -> FlightSubscription {
        FlightSubscription {
            key: self.key.clone(),
            outcome: self.sender.subscribe(),
        }
    }

    /// Callers currently subscribed to this flight's outcome.
    pub fn waiting(&self) -> usize {
        // The registry keeps one receiver to hand out to joiners.
        let registry_held = usize::from(!self.released);
        self.sender.receiver_count().saturating_sub(registry_held)
    }

    /// Releases the key, then hands `outcome` to every subscriber.
    ///
    /// Releasing first lets a caller retry immediately after a failure.
    pub fn complete(mut self, outcome: FlightOutcome) {
        self.registry.release(&self.key, self.id);
        self.released = true;
        self.sender.send_replace(Some(outcome));
    }
}

impl Drop for FlightHandle {
    fn drop(&mut self) {
        if !self.released {
            self.registry.release(&self.key, self.id);
        }
    }
}

// == Flight Subscription ==
/// A caller waiting on somebody else's fetch.
#[derive(Debug)]
pub struct FlightSubscription {
    key: String,
    outcome: OutcomeReceiver,
}

impl FlightSubscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits until the owning flight settles.
    pub async fn outcome(mut self) -> FlightOutcome {
        let published = match self.outcome.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone(),
            Err(_) => None,
        };
        published.unwrap_or_else(|| Err(FetchError::Abandoned(self.key)))
    }
}
