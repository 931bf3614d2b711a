//! API Module
//!
//! HTTP handlers and routing for the caching fetch proxy.
//!
//! # Endpoints
//! - `GET /fetch/*path` - Fetch an upstream resource through the cache
//! - `POST /cache/invalidate` - Invalidate by key or key prefix
//! - `DELETE /cache` - Clear the cache
//! - `PUT /config` - Toggle the global enable flag
//! - `GET /stats` - Cache and fetch statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
