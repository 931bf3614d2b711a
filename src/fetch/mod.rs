//! Fetch Module
//!
//! Cache-aware fetching: key derivation, request options, in-flight
//! deduplication, lifecycle signals and the interceptor tying them together.

mod interceptor;
mod key;
mod options;
mod pending;
mod signals;

pub use interceptor::{FetchCache, FetchOutcome, FetchSource, FetchStats, InterceptorConfig};
pub use key::{derive_key, KeyGenerator, UrlKeyGenerator};
pub use options::FetchOptions;
pub use pending::{Claim, FlightHandle, FlightOutcome, FlightSubscription, PendingRegistry};
pub use signals::{Signal, SignalObserver, SignalRecorder, Signals};
