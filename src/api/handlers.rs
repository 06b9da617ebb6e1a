//! API Handlers
//!
//! HTTP request handlers for the proxy's endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use bytes::Bytes;
use tracing::{error, info, warn};

use crate::cache::InMemoryCache;
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::models::{HealthResponse, PreferencesRequest, PreferencesResponse, StatsResponse};
use crate::preferences::{InMemoryPreferenceStore, PreferenceStore};
use crate::proxy::{ProxyEngine, ProxyStats, RouteTable, UpstreamClient};

/// Response header telling clients whether the body came from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: ProxyEngine,
    pub routes: Arc<RouteTable>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        engine: ProxyEngine,
        routes: RouteTable,
        preferences: Arc<dyn PreferenceStore>,
        config: Config,
    ) -> Self {
        Self {
            engine,
            routes: Arc::new(routes),
            preferences,
            config: Arc::new(config),
        }
    }

    /// Builds the in-process cache, route table and preference store from
    /// configuration. The upstream client is supplied by the caller.
    pub fn from_config(config: Config, upstream: Arc<dyn UpstreamClient>) -> Result<Self> {
        let routes = RouteTable::from_config(&config)?;
        let engine = ProxyEngine::new(
            Arc::new(InMemoryCache::new(config.max_entries)),
            upstream,
            Arc::new(ProxyStats::new()),
        );

        Ok(Self::new(
            engine,
            routes,
            Arc::new(InMemoryPreferenceStore::new()),
            config,
        ))
    }
}

/// Fallback handler: every path not claimed by another endpoint is looked
/// up in the route table and proxied.
pub async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response> {
    let path = uri.path();
    let route = state
        .routes
        .resolve(path)
        .ok_or_else(|| ProxyError::RouteNotFound(path.to_string()))?;

    if method != Method::GET {
        return Err(ProxyError::MethodNotAllowed);
    }

    let reply = state.engine.serve(route, path, uri.query()).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (X_CACHE, reply.source.as_str()),
        ],
        reply.body,
    )
        .into_response())
}

/// Handler for POST /api/1/preferences
///
/// The body is read raw and decoded here so that malformed JSON is logged
/// and answered the same way as a store failure.
pub async fn preferences_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PreferencesResponse>> {
    let req: PreferencesRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("Error decoding preferences json: {}", e);
        ProxyError::PreferenceDecode(e.to_string())
    })?;

    if let Some(error_msg) = req.validate() {
        warn!("Rejected preferences update: {}", error_msg);
        return Err(ProxyError::PreferenceDecode(error_msg));
    }

    let registration_id = req.registration_id.clone();
    state
        .preferences
        .upsert(req.into_preference())
        .await
        .inspect_err(|e| error!("Error updating preferences: {}", e))?;

    info!("preferences updated for {}", registration_id);
    Ok(Json(PreferencesResponse::new(registration_id)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.engine.stats().snapshot().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /
///
/// Sends visitors to the client download page.
pub async fn home_handler(State(state): State<AppState>) -> Response {
    let target = &state.config.client_download_url;
    if target.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }
    Redirect::to(target).into_response()
}
