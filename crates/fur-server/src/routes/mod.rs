//! Axum router construction.
//!
//! [`build`] mounts every route at the root and again below the configured
//! API prefix, then adds request tracing and the upload size limit.
//!
//! The limit is enforced by the body extractor, so oversized uploads are
//! answered by the handler with the usual `{"error": ...}` body.

mod catalog;
mod health;
mod index;
mod packages;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::AppState;

pub use packages::{ListParams, PackageList};

/// Build the complete router for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(index::router())
        .merge(health::router())
        .merge(packages::router())
        .merge(catalog::router());

    let mut app = Router::new().merge(api.clone());
    if state.api_prefix != "/" {
        app = app.nest(&state.api_prefix, api);
    }

    app.layer(DefaultBodyLimit::max(state.max_upload_size))
        .layer(TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO)))
        .with_state(state)
}
