//! Response DTOs for the proxy API
//!
//! Proxied bodies are written through untouched; these cover the proxy's
//! own endpoints.

use serde::Serialize;

use crate::proxy::StatsSnapshot;

/// Response body for `POST /api/1/preferences`
#[derive(Debug, Clone, Serialize)]
pub struct PreferencesResponse {
    pub message: String,
    pub registration_id: String,
}

impl PreferencesResponse {
    pub fn new(registration_id: impl Into<String>) -> Self {
        let registration_id = registration_id.into();
        Self {
            message: format!("Preferences for '{}' updated", registration_id),
            registration_id,
        }
    }
}

/// `GET /stats` body: the proxy counters plus the derived hit rate
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counters: StatsSnapshot,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(counters: StatsSnapshot) -> Self {
        Self {
            hit_rate: counters.hit_rate(),
            counters,
        }
    }
}

/// `GET /health` body
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// RFC 3339, UTC
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// JSON body of every error answer produced by the proxy itself.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
