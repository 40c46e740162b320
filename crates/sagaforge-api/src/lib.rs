//! Sagaforge — HTTP API.
//!
//! Exposes the session engine over JSON. The router is built here so the
//! server binary and the integration tests share one route layout.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod narrator_client;
pub mod routes;
pub mod state;

use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(app_state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    Router::new()
        .merge(routes::health::router())
        .merge(routes::worlds::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
