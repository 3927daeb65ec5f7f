//! Catalog-wide views: statistics, popular tags/authors and browsing.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use fur_registry::stats::Statistics;
use serde::Deserialize;

use super::packages::PackageList;
use crate::{error::ServerError, state::AppState};

const DEFAULT_LIMIT: usize = 10;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/statistics", get(get_statistics))
        .route("/tags", get(popular_tags))
        .route("/tags/{tag}", get(packages_by_tag))
        .route("/authors", get(popular_authors))
        .route("/authors/{author}", get(packages_by_author))
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

fn limit_of(params: Result<Query<LimitParams>, QueryRejection>) -> Result<usize, ServerError> {
    let Query(params) = params.map_err(|err| ServerError::BadRequest(err.body_text()))?;
    Ok(params.limit.unwrap_or(DEFAULT_LIMIT))
}

async fn get_statistics(State(state): State<Arc<AppState>>) -> Json<Statistics> {
    Json(state.registry.statistics())
}

async fn popular_tags(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<String>>, ServerError> {
    Ok(Json(state.registry.popular_tags(limit_of(params)?)))
}

async fn popular_authors(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> Result<Json<Vec<String>>, ServerError> {
    Ok(Json(state.registry.popular_authors(limit_of(params)?)))
}

async fn packages_by_tag(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
) -> Json<PackageList> {
    let records = state.registry.by_tag(&tag);
    Json(PackageList::new(records.len(), records, true))
}

async fn packages_by_author(
    State(state): State<Arc<AppState>>,
    Path(author): Path<String>,
) -> Json<PackageList> {
    let records = state.registry.by_author(&author);
    Json(PackageList::new(records.len(), records, true))
}
