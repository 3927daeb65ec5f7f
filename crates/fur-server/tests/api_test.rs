use std::{path::Path, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use fur_registry::{
    seed,
    store::{DescriptorStore, FsDescriptorStore},
    Descriptor, Registry, RegistryError,
};
use fur_server::{routes, state::AppState};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::util::ServiceExt; // for `oneshot`

const UPLOAD_LIMIT: usize = 64 * 1024;

fn app_with(registry: Registry) -> Router {
    app_with_limit(registry, UPLOAD_LIMIT)
}

fn app_with_limit(registry: Registry, max_upload_size: usize) -> Router {
    routes::build(Arc::new(AppState {
        registry: Arc::new(registry),
        api_prefix: "/api/v1".into(),
        max_upload_size,
    }))
}

fn fs_app(root: &Path, seed: Option<Vec<Descriptor>>) -> Router {
    let store = FsDescriptorStore::open(root).unwrap();
    app_with(Registry::open(Arc::new(store), seed).unwrap())
}

/// An empty registry backed by a fresh temporary directory.
fn empty_app() -> (TempDir, Router) {
    let dir = tempdir().unwrap();
    let app = fs_app(dir.path(), None);
    (dir, app)
}

/// A registry seeded with the bundled example packages.
fn seeded_app() -> (TempDir, Router) {
    let dir = tempdir().unwrap();
    let app = fs_app(dir.path(), Some(seed::bundled().unwrap()));
    (dir, app)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn post_json(uri: &str, value: &Value) -> Request<Body> {
    post(uri, value.to_string())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn package(name: &str) -> Value {
    json!({
        "name": name,
        "version": "1.0.0",
        "authors": ["a"],
        "homepage": "h",
        "issue_tracker": "i",
        "git": "g",
        "installer": "inst",
        "dependencies": []
    })
}

fn names(body: &Value) -> Vec<String> {
    body["packages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|name| name.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_upload_then_fetch() {
    let (_dir, app) = empty_app();

    let (status, body) = send(&app, post_json("/packages", &package("foo"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "foo");
    assert_eq!(body["description"], "");
    assert_eq!(body["Supported_Platforms"], json!([]));
    assert!(body.get("downloads").is_none());

    let (status, body) = send(&app, get("/packages/foo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "1.0.0");

    let (status, body) = send(&app, get("/api/v1/packages/foo/1.0.0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "foo");
}

#[tokio::test]
async fn test_null_dependencies_are_missing() {
    let (_dir, app) = empty_app();
    let mut payload = package("foo");
    payload["dependencies"] = Value::Null;

    let (status, body) = send(&app, post_json("/packages", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: dependencies");
}

#[tokio::test]
async fn test_bad_version() {
    let (_dir, app) = empty_app();
    let mut payload = package("foo");
    payload["version"] = json!("1.0");

    let (status, body) = send(&app, post_json("/api/v1/packages", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("x.y.z format"));

    let (status, _) = send(&app, get("/packages/foo")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_version_mismatch_fetch() {
    let (_dir, app) = empty_app();
    send(&app, post_json("/packages", &package("foo"))).await;

    let (status, body) = send(&app, get("/packages/foo/2.0.0")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Version '2.0.0' not found for package 'foo'");

    let (status, body) = send(&app, get("/packages/bar")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Package 'bar' not found");
}

#[tokio::test]
async fn test_duplicate_upload_conflicts() {
    let (_dir, app) = empty_app();
    let (status, _) = send(&app, post_json("/packages", &package("foo"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut newer = package("foo");
    newer["version"] = json!("2.0.0");
    newer["description"] = json!("different");

    let (status, body) = send(&app, post_json("/packages", &newer)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Package 'foo' already exists");

    let (_, body) = send(&app, get("/packages/foo")).await;
    assert_eq!(body["version"], "1.0.0");
}

#[tokio::test]
async fn test_slug_collision_conflicts() {
    let (dir, app) = empty_app();
    send(&app, post_json("/packages", &package("acme/tool"))).await;

    let (status, body) = send(&app, post_json("/packages", &package("acme:tool"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Package name 'acme:tool' conflicts with existing package 'acme/tool'"
    );

    let stored = std::fs::read_to_string(dir.path().join("acme_tool/furconfig.json")).unwrap();
    assert!(stored.contains("\"acme/tool\""));
}

#[tokio::test]
async fn test_missing_fields_reported_in_order() {
    let (_dir, app) = empty_app();
    let mut payload = package("foo");
    let object = payload.as_object_mut().unwrap();
    object.remove("installer");
    object.remove("authors");
    object.insert("git".into(), json!(""));

    let (status, body) = send(&app, post_json("/packages", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Missing required fields: authors, git, installer"
    );
}

#[tokio::test]
async fn test_empty_and_malformed_bodies() {
    let (_dir, app) = empty_app();

    for body in ["", "  \n", "{}", "null"] {
        let (status, response) = send(&app, post("/packages", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body:?}");
        assert_eq!(response["error"], "No JSON data provided", "{body:?}");
    }

    let (status, response) = send(&app, post("/packages", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let (_dir, app) = empty_app();
    let mut payload = package("big");
    payload["long_description"] = json!("x".repeat(UPLOAD_LIMIT));

    let (status, body) = send(&app, post_json("/packages", &payload)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        body["error"],
        format!("Upload exceeds the limit of {UPLOAD_LIMIT} bytes")
    );

    let (status, _) = send(&app, get("/packages/big")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_configured_limit_above_axum_default() {
    const LIMIT: usize = 8 * 1024 * 1024;
    let dir = tempdir().unwrap();
    let store = FsDescriptorStore::open(dir.path()).unwrap();
    let app = app_with_limit(Registry::open(Arc::new(store), None).unwrap(), LIMIT);

    let mut payload = package("large");
    payload["long_description"] = json!("x".repeat(3 * 1024 * 1024));
    let (status, body) = send(&app, post_json("/packages", &payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "large");

    let mut payload = package("huge");
    payload["long_description"] = json!("x".repeat(LIMIT));
    let (status, body) = send(&app, post_json("/packages", &payload)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        body["error"],
        format!("Upload exceeds the limit of {LIMIT} bytes")
    );
}

#[tokio::test]
async fn test_sort_is_stable_for_ties() {
    let (_dir, app) = empty_app();
    for name in ["charlie", "alpha", "bravo"] {
        send(&app, post_json("/packages", &package(name))).await;
    }

    let (status, body) = send(&app, get("/packages?sort=mostDownloads")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["charlie", "alpha", "bravo"]);

    let (_, body) = send(&app, get("/packages?sort=unknown")).await;
    assert_eq!(names(&body), ["alpha", "bravo", "charlie"]);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let (_dir, app) = empty_app();
    let mut crypto = package("vault");
    crypto["tags"] = json!(["crypto"]);
    send(&app, post_json("/packages", &crypto)).await;
    send(&app, post_json("/packages", &package("other"))).await;

    let (_, body) = send(&app, get("/packages?search=CRYPTO")).await;
    assert_eq!(body["package_count"], 1);
    assert_eq!(names(&body), ["vault"]);
    assert!(body.get("package_details").is_none());

    let (_, body) = send(&app, get("/packages?search=nomatch123")).await;
    assert_eq!(body["package_count"], 0);
    assert_eq!(body["packages"], json!([]));
}

#[tokio::test]
async fn test_list_details_and_pagination() {
    let (_dir, app) = seeded_app();

    let (status, body) = send(&app, get("/api/v1/packages?details=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["package_count"], 5);
    assert_eq!(
        names(&body),
        [
            "crypto-utils",
            "database-connector",
            "json-parser",
            "ui-toolkit",
            "web-framework"
        ]
    );
    let details = body["package_details"].as_array().unwrap();
    assert_eq!(details.len(), 5);
    assert_eq!(details[2]["name"], "json-parser");
    assert_eq!(details[2]["license"], "Apache-2.0");

    let (_, body) = send(&app, get("/packages?page=2&page_size=2&details=true")).await;
    assert_eq!(body["package_count"], 5);
    assert_eq!(names(&body), ["json-parser", "ui-toolkit"]);
    assert_eq!(body["package_details"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, get("/packages?page=9&page_size=2")).await;
    assert_eq!(body["package_count"], 5);
    assert_eq!(body["packages"], json!([]));

    let (status, _) = send(&app, get("/packages?page_size=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/packages?page_size=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_round_trip_across_restart() {
    let dir = tempdir().unwrap();
    let mut payload = package("persisted");
    payload["keywords"] = json!(["one", "two"]);
    payload["license"] = json!("MIT");
    payload["downloads"] = json!(42);

    let (status, uploaded) = send(
        &fs_app(dir.path(), None),
        post_json("/packages", &payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let restarted = fs_app(dir.path(), Some(seed::bundled().unwrap()));
    let (status, fetched) = send(&restarted, get("/packages/persisted")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, uploaded);
    assert!(fetched.get("downloads").is_none());

    // an existing store is never seeded
    let (_, health) = send(&restarted, get("/health")).await;
    assert_eq!(health["total_packages"], 1);
}

#[tokio::test]
async fn test_health_and_index() {
    let (_dir, app) = seeded_app();

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["total_packages"], 5);
    assert!(body["timestamp"].as_str().is_some());

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "FUR Package Registry API");
    assert!(body["endpoints"]
        .as_object()
        .unwrap()
        .contains_key("POST /api/v1/packages"));

    let (status, _) = send(&app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_statistics() {
    let (_dir, app) = seeded_app();

    let (status, body) = send(&app, get("/statistics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_packages"], 5);
    assert_eq!(body["total_downloads"], 0);
    assert_eq!(body["most_downloaded"].as_array().unwrap().len(), 5);
    assert_eq!(body["most_downloaded"][0]["name"], "web-framework");
    assert_eq!(body["popular_authors"][0], "devuser1");
    assert!(body["recently_added"][0]["added_date"].is_string());
}

#[tokio::test]
async fn test_tags_and_authors() {
    let (_dir, app) = seeded_app();
    let mut extra = package("web-extras");
    extra["tags"] = json!(["Web"]);
    extra["authors"] = json!([" devuser1 "]);
    send(&app, post_json("/packages", &extra)).await;

    let (_, body) = send(&app, get("/tags?limit=3")).await;
    assert_eq!(body, json!(["web", "framework", "json"]));

    let (_, body) = send(&app, get("/api/v1/authors")).await;
    assert_eq!(body[0], "devuser1");
    assert_eq!(body.as_array().unwrap().len(), 9);

    let (_, body) = send(&app, get("/tags/WEB")).await;
    assert_eq!(body["package_count"], 2);
    assert_eq!(names(&body), ["web-extras", "web-framework"]);
    assert_eq!(body["package_details"][1]["version"], "2.1.0");

    let (_, body) = send(&app, get("/authors/devuser1")).await;
    assert_eq!(names(&body), ["web-extras", "web-framework"]);

    let (_, body) = send(&app, get("/authors/nobody")).await;
    assert_eq!(body["package_count"], 0);
}

struct FailingStore;

impl DescriptorStore for FailingStore {
    fn put(&self, descriptor: &Descriptor) -> fur_registry::Result<()> {
        Err(RegistryError::IoError {
            action: format!("writing {}", descriptor.name),
            source: std::io::Error::other("disk full"),
        })
    }

    fn load_all(&self) -> fur_registry::Result<Vec<Descriptor>> {
        Ok(Vec::new())
    }
}

struct FullDisk;

impl DescriptorStore for FullDisk {
    fn put(&self, descriptor: &Descriptor) -> fur_registry::Result<()> {
        Err(RegistryError::Storage {
            name: descriptor.name.clone(),
            source: fur_utils::error::FileSystemError::File {
                path: "/srv/fur/projects/foo/furconfig.json".into(),
                action: "write",
                source: std::io::Error::other("disk full"),
            },
        })
    }

    fn load_all(&self) -> fur_registry::Result<Vec<Descriptor>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_storage_failure_leaves_catalog_unchanged() {
    let app = app_with(Registry::open(Arc::new(FullDisk), None).unwrap());

    let (status, body) = send(&app, post_json("/packages", &package("foo"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to save package to file");

    let (status, _) = send(&app, get("/packages/foo")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = send(&app, get("/packages")).await;
    assert_eq!(body["package_count"], 0);

    let app = app_with(Registry::open(Arc::new(FailingStore), None).unwrap());
    let (status, body) = send(&app, post_json("/packages", &package("foo"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");
}
