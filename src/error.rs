//! Error types for the caching proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors raised by a cache store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Key or value rejected by the store
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Any other backend failure
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// Returns true for the two outcomes that mean "absent" rather than "broken".
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Expired(_))
    }
}

// == Proxy Error Enum ==
/// Request-level error type for the proxy boundary.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// A query parameter is not allowed for the route or failed validation
    #[error("Unusable query param: {0}")]
    InvalidQueryParameter(String),

    /// Network or timeout failure talking to an upstream
    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    /// Upstream returned bytes that don't match the expected envelope
    #[error("Upstream parse error: {0}")]
    UpstreamParse(String),

    /// Cache backend failure surfaced to the caller
    #[error(transparent)]
    CacheBackend(#[from] CacheError),

    /// No proxy route matches the request path
    #[error("No route for path: {0}")]
    RouteNotFound(String),

    /// Proxy routes only answer GET
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Preference payload could not be decoded
    #[error("Error decoding json: {0}")]
    PreferenceDecode(String),

    /// Preference store rejected the update
    #[error("Error updating preferences: {0}")]
    PreferenceStore(String),

    /// Invalid startup configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ProxyError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, self.to_string()),
            ProxyError::RouteNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ProxyError::InvalidQueryParameter(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            // Upstream details stay in the logs.
            ProxyError::UpstreamTransport(_)
            | ProxyError::UpstreamParse(_)
            | ProxyError::CacheBackend(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Upstream request failed".to_string(),
            ),
            ProxyError::PreferenceDecode(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error decoding json".to_string(),
            ),
            ProxyError::PreferenceStore(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error updating preferences".to_string(),
            ),
            ProxyError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_is_miss() {
        assert!(CacheError::NotFound("k".into()).is_miss());
        assert!(CacheError::Expired("k".into()).is_miss());
        assert!(!CacheError::Backend("down".into()).is_miss());
        assert!(!CacheError::CacheFull("full".into()).is_miss());
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ProxyError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (ProxyError::RouteNotFound("/x".into()), StatusCode::NOT_FOUND),
            (
                ProxyError::InvalidQueryParameter("limit".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ProxyError::UpstreamParse("eof".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ProxyError::PreferenceDecode("eof".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_cache_error_converts() {
        let err: ProxyError = CacheError::Backend("timeout".into()).into();
        assert!(matches!(err, ProxyError::CacheBackend(_)));
        assert!(err.to_string().contains("timeout"));
    }
}
