//! Shared test helpers for creating VsixDownloader instances in tests.

use crate::config::Config;
use crate::downloader::VsixDownloader;
use crate::types::Event;
use tempfile::{TempDir, tempdir};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointing every marketplace URL at `server_uri` and every file into `temp_dir`
pub(crate) fn test_config(temp_dir: &TempDir, server_uri: &str) -> Config {
    let mut config = Config::default();
    config.marketplace.page_host = "127.0.0.1".to_string();
    config.marketplace.api_base = format!("{}/_apis/public/gallery", server_uri);
    config.download.download_dir = Some(temp_dir.path().join("downloads"));
    config.server.api.settings_path = Some(temp_dir.path().join("settings.json"));

    std::fs::create_dir_all(temp_dir.path().join("downloads")).unwrap();
    config
}

/// Downloader whose marketplace is unreachable (for tests that never hit the network).
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) fn create_test_downloader() -> (VsixDownloader, TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(&temp_dir, "http://127.0.0.1:1");
    let downloader = VsixDownloader::new(config).unwrap();
    (downloader, temp_dir)
}

/// Downloader wired to a fresh mock marketplace
pub(crate) async fn create_mocked_downloader() -> (VsixDownloader, MockServer, TempDir) {
    let server = MockServer::start().await;
    let temp_dir = tempdir().unwrap();
    let config = test_config(&temp_dir, &server.uri());
    let downloader = VsixDownloader::new(config).unwrap();
    (downloader, server, temp_dir)
}

/// Item page URL on the mock marketplace
pub(crate) fn item_url(server: &MockServer, item_name: &str) -> String {
    format!("{}/items?itemName={}", server.uri(), item_name)
}

/// Mount an item page advertising `version` for `publisher.name`
pub(crate) async fn mount_item_page(
    server: &MockServer,
    publisher: &str,
    name: &str,
    version: &str,
) {
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("itemName", format!("{}.{}", publisher, name)))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><script type="application/json">{{"name":"{}","version":"{}"}}</script></html>"#,
            name, version
        )))
        .mount(server)
        .await;
}

/// Mount the vspackage endpoint for one extension version
pub(crate) async fn mount_package(
    server: &MockServer,
    publisher: &str,
    name: &str,
    version: &str,
    template: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/_apis/public/gallery/publishers/{}/vsextensions/{}/{}/vspackage",
            publisher, name, version
        )))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Everything currently buffered on `rx`
pub(crate) fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
