//! Package lookup, listing and upload.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fur_registry::{
    query::{Page, SortKey},
    Descriptor, ListQuery, PackageRecord, RegistryError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::ServerError, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/packages", get(list_packages).post(upload_package))
        .route("/packages/{name}", get(get_package))
        .route("/packages/{name}/{version}", get(get_package_version))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub details: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListParams {
    fn wants_details(&self) -> bool {
        self.details
            .as_deref()
            .is_some_and(|details| details.eq_ignore_ascii_case("true"))
    }

    fn to_query(&self) -> Result<ListQuery, ServerError> {
        let page = match self.page_size {
            Some(size) => {
                Some(Page::new(self.page.unwrap_or(1), size).ok_or_else(|| {
                    ServerError::BadRequest("page_size must be at least 1".into())
                })?)
            }
            None => None,
        };

        Ok(ListQuery {
            search: self.search.clone(),
            sort: self.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
            page,
        })
    }
}

/// Body of every listing endpoint.
#[derive(Debug, Serialize)]
pub struct PackageList {
    pub package_count: usize,
    pub packages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_details: Option<Vec<Descriptor>>,
}

impl PackageList {
    pub fn new(total: usize, records: Vec<PackageRecord>, details: bool) -> Self {
        let packages = records.iter().map(|r| r.name().to_string()).collect();
        let package_details =
            details.then(|| records.into_iter().map(|r| r.descriptor).collect());

        Self {
            package_count: total,
            packages,
            package_details,
        }
    }
}

async fn list_packages(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PackageList>, ServerError> {
    let Query(params) = params.map_err(|err| ServerError::BadRequest(err.body_text()))?;
    let result = state.registry.list(&params.to_query()?);

    Ok(Json(PackageList::new(
        result.total,
        result.records,
        params.wants_details(),
    )))
}

async fn get_package(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Descriptor>, ServerError> {
    Ok(Json(state.registry.get(&name, None)?))
}

async fn get_package_version(
    State(state): State<Arc<AppState>>,
    Path((name, version)): Path<(String, String)>,
) -> Result<Json<Descriptor>, ServerError> {
    Ok(Json(state.registry.get(&name, Some(&version))?))
}

/// Accepts a furconfig document as the raw request body.
///
/// The body is read as bytes so that a missing or blank body reports the
/// registry's own message instead of an extractor rejection.
async fn upload_package(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Descriptor>), ServerError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(state.max_upload_size)
        } else {
            ServerError::BadRequest(rejection.body_text())
        }
    })?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RegistryError::EmptyPayload.into());
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|err| ServerError::BadRequest(format!("Invalid JSON: {err}")))?;

    let registry = Arc::clone(&state.registry);
    let descriptor = tokio::task::spawn_blocking(move || registry.upload(&payload)).await??;

    Ok((StatusCode::CREATED, Json(descriptor)))
}
