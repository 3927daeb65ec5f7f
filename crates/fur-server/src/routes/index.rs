use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Map, Value};

use crate::state::AppState;

const API_VERSION: &str = "1.0.0";

const ENDPOINTS: [(&str, &str, &str); 11] = [
    ("GET", "/packages", "List all packages"),
    ("GET", "/packages/{name}", "Get package details"),
    ("GET", "/packages/{name}/{version}", "Get specific package version"),
    ("POST", "/packages", "Upload a new package"),
    ("GET", "/statistics", "Registry statistics"),
    ("GET", "/tags", "Most used tags"),
    ("GET", "/tags/{tag}", "Packages with a tag"),
    ("GET", "/authors", "Most active authors"),
    ("GET", "/authors/{author}", "Packages by an author"),
    ("GET", "/health", "Health check"),
    ("GET", "/", "This description"),
];

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_index))
}

async fn get_index(State(state): State<Arc<AppState>>) -> Json<Value> {
    let prefix = state.api_prefix.trim_end_matches('/');
    let endpoints: Map<String, Value> = ENDPOINTS
        .iter()
        .map(|(method, path, about)| {
            let path = match *path {
                "/" | "/health" => path.to_string(),
                _ => format!("{prefix}{path}"),
            };
            (format!("{method} {path}"), Value::from(*about))
        })
        .collect();

    Json(json!({
        "message": "FUR Package Registry API",
        "version": API_VERSION,
        "endpoints": endpoints,
    }))
}
