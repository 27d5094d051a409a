//! Mock marketplace and downloader fixtures

use tempfile::TempDir;
use vsix_dl::{Config, VsixDownloader};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Item page as the marketplace serves it: version buried in embedded JSON
pub fn item_page(name: &str, version: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>{name} - Visual Studio Marketplace</title></head>
  <body>
    <div class="ux-item-name">{name}</div>
    <script class="jiContent" type="application/json">{{"itemName":"{name}","version":"{version}","installs":1}}</script>
  </body>
</html>"#
    )
}

/// A marketplace stand-in plus the downloader pointed at it
pub struct MockMarketplace {
    /// The HTTP server answering page and package requests
    pub server: MockServer,
    /// Keeps download and settings paths alive
    pub temp_dir: TempDir,
    /// Downloader configured against `server`
    pub downloader: VsixDownloader,
}

impl MockMarketplace {
    /// Start a server and a downloader saving into `<temp>/downloads`
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let temp_dir = tempfile::tempdir().unwrap();
        let downloader = VsixDownloader::new(config_for(&server, &temp_dir)).unwrap();
        Self {
            server,
            temp_dir,
            downloader,
        }
    }

    /// Directory transfers land in
    pub fn download_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("downloads")
    }

    /// Item URL on this marketplace
    pub fn item_url(&self, item_name: &str) -> String {
        format!("{}/items?itemName={}", self.server.uri(), item_name)
    }

    /// Serve an item page advertising `version`
    pub async fn publish_page(&self, publisher: &str, name: &str, version: &str) {
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("itemName", format!("{publisher}.{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(item_page(name, version)))
            .mount(&self.server)
            .await;
    }

    /// Serve the package bytes for one version
    pub async fn publish_package(&self, publisher: &str, name: &str, version: &str, body: &[u8]) {
        self.publish_package_with(
            publisher,
            name,
            version,
            ResponseTemplate::new(200).set_body_bytes(body.to_vec()),
        )
        .await;
    }

    /// Serve an arbitrary response for one version's package
    pub async fn publish_package_with(
        &self,
        publisher: &str,
        name: &str,
        version: &str,
        template: ResponseTemplate,
    ) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/_apis/public/gallery/publishers/{publisher}/vsextensions/{name}/{version}/vspackage"
            )))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }
}

/// Configuration pointing the marketplace at `server` and files into `temp_dir`
pub fn config_for(server: &MockServer, temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.marketplace.page_host = "127.0.0.1".to_string();
    config.marketplace.api_base = format!("{}/_apis/public/gallery", server.uri());

    let downloads = temp_dir.path().join("downloads");
    std::fs::create_dir_all(&downloads).unwrap();
    config.download.download_dir = Some(downloads);
    config.server.api.settings_path = Some(temp_dir.path().join("settings.json"));
    config
}
