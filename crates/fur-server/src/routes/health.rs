use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use fur_registry::Health;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Liveness probe with the current package count.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(state.registry.health())
}
