//! Fetch lifecycle signals.
//!
//! Entities expose a [`Signals`] registry; anything interested in an
//! entity's fetches registers an observer on it.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

/// A named notification emitted while a fetch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// A network call was started
    Request,
    /// The entity's data was updated, from the network or the cache
    Sync,
    /// The data was served from the cache without a network call
    #[serde(rename = "cachesync")]
    CacheSync,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Request => "request",
            Signal::Sync => "sync",
            Signal::CacheSync => "cachesync",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Observer ==
/// Receives signals. `key` is the cache key when the fetch consulted the cache.
pub trait SignalObserver: Send + Sync {
    fn notify(&self, signal: Signal, key: Option<&str>);
}

impl<F> SignalObserver for F
where
    F: Fn(Signal, Option<&str>) + Send + Sync,
{
    fn notify(&self, signal: Signal, key: Option<&str>) {
        self(signal, key)
    }
}

// == Signals Registry ==
/// Observers registered on one entity, notified in registration order.
#[derive(Clone, Default)]
pub struct Signals {
    observers: Vec<Arc<dyn SignalObserver>>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback.
    pub fn on<F>(&mut self, callback: F)
    where
        F: Fn(Signal, Option<&str>) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(callback));
    }

    /// Registers a shared observer.
    pub fn subscribe(&mut self, observer: Arc<dyn SignalObserver>) {
        self.observers.push(observer);
    }

    pub fn emit(&self, signal: Signal, key: Option<&str>) {
        for observer in &self.observers {
            observer.notify(signal, key);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for Signals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signals")
            .field("observers", &self.observers.len())
            .finish()
    }
}

// == Recorder ==
/// Observer that remembers every signal it saw, in order.
///
/// Subscribe it to an entity to check afterwards which path a fetch took:
///
/// ```
/// use fetch_cache::fetch::{Signal, SignalRecorder, Signals};
///
/// let recorder = SignalRecorder::new();
/// let mut signals = Signals::new();
/// signals.subscribe(recorder.clone());
///
/// signals.emit(Signal::CacheSync, Some("/agents"));
/// signals.emit(Signal::Sync, Some("/agents"));
///
/// assert_eq!(recorder.signals(), vec![Signal::CacheSync, Signal::Sync]);
/// assert!(!recorder.saw(Signal::Request));
/// ```
#[derive(Debug, Default)]
pub struct SignalRecorder {
    seen: Mutex<Vec<Signal>>,
}

impl SignalRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn saw(&self, signal: Signal) -> bool {
        self.signals().contains(&signal)
    }

    pub fn clear(&self) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl SignalObserver for SignalRecorder {
    fn notify(&self, signal: Signal, _key: Option<&str>) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
    }
}
