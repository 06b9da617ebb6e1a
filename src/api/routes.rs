//! API Routes
//!
//! Configures the Axum router. Proxy routes are not registered one by one;
//! anything the named endpoints don't claim falls through to the route table.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, home_handler, preferences_handler, proxy_handler, stats_handler, AppState,
};

/// Path of the notification preferences endpoint.
pub const PREFERENCES_PATH: &str = "/api/1/preferences";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Redirect to the client download page
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Proxy counters
/// - `POST /api/1/preferences` - Upsert notification preferences
/// - anything else - proxied through the route table
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route(PREFERENCES_PATH, post(preferences_handler))
        .fallback(proxy_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
