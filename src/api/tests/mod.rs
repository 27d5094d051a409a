use super::*;
use crate::downloader::test_helpers::{self, item_url, mount_item_page, mount_package};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::{MockServer, ResponseTemplate};

mod downloads;
mod settings;

/// Helper to create a test VsixDownloader instance wrapped in Arc
fn create_test_downloader() -> (Arc<VsixDownloader>, tempfile::TempDir) {
    let (downloader, temp_dir) = test_helpers::create_test_downloader();
    (Arc::new(downloader), temp_dir)
}

/// Same, but wired to a mock marketplace
async fn create_mocked_downloader() -> (Arc<VsixDownloader>, MockServer, tempfile::TempDir) {
    let (downloader, server, temp_dir) = test_helpers::create_mocked_downloader().await;
    (Arc::new(downloader), server, temp_dir)
}

/// Router built from the downloader's own configuration
fn router_for(downloader: &Arc<VsixDownloader>) -> Router {
    create_router(downloader.clone(), downloader.get_config())
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (downloader, _temp_dir) = create_test_downloader();

    // Port 0 = OS assigns a free port
    let mut config = (*downloader.get_config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let downloader = downloader.clone();
        let config = config.clone();
        async move { start_api_server(downloader, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server exited early");

    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (downloader, _temp_dir) = create_test_downloader();

    let mut config = (*downloader.get_config()).clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (downloader, _temp_dir) = create_test_downloader();

    let mut config = (*downloader.get_config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[test]
fn test_cors_specific_origins() {
    // Unparseable origins are skipped rather than rejected
    let _layer = build_cors_layer(&[
        "http://localhost:3000".to_string(),
        "not a header\n".to_string(),
    ]);
}
