//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: drops stale cache entries at the configured interval

mod cleanup;

pub use cleanup::{spawn_cleanup_task, spawn_cleanup_task_every};
