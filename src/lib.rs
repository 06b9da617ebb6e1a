//! Cache Proxy - a caching reverse proxy for third-party media APIs
//!
//! Normalizes client queries, injects credentials and serves upstream
//! responses from an in-process TTL cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod preferences;
pub mod proxy;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{CacheError, ProxyError};
