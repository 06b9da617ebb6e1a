//! API Module
//!
//! HTTP handlers and routing for the proxy.
//!
//! # Endpoints
//! - `GET /` - Redirect to the client download page
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Proxy counters
//! - `POST /api/1/preferences` - Notification preferences
//! - `GET /api/1/giantbomb/...`, `GET /api/1/youtube/...` - Cached upstream reads

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, PREFERENCES_PATH};
