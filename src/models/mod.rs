//! Request and Response models for the fetch cache API
//!
//! DTOs used for parsing and serializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ConfigRequest, FetchQuery, InvalidateRequest};
pub use responses::{
    ConfigResponse, FetchResponse, HealthResponse, InvalidateResponse, StatsResponse,
};
