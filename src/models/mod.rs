//! Request and Response models for the proxy's own endpoints
//!
//! Proxied upstream bodies never pass through these types.

pub mod requests;
pub mod responses;

pub use requests::PreferencesRequest;
pub use responses::{ErrorResponse, HealthResponse, PreferencesResponse, StatsResponse};
