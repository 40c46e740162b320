//! World catalog endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use sagaforge_world::World;

use crate::state::AppState;

/// GET /api/v1/worlds
async fn list_worlds(State(state): State<AppState>) -> Json<Vec<World>> {
    Json(state.worlds.worlds().to_vec())
}

/// Returns the router for the world catalog.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/worlds", get(list_worlds))
}
