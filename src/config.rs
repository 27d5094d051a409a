//! Configuration types for vsix-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Marketplace endpoints and request behavior
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MarketplaceConfig {
    /// Host a pasted URL must contain (default: "marketplace.visualstudio.com")
    #[serde(default = "default_page_host")]
    pub page_host: String,

    /// Base of the gallery API used to build package URLs
    /// (default: "https://marketplace.visualstudio.com/_apis/public/gallery")
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// User-Agent sent with every request. Marketplace pages vary their content
    /// by client, so this defaults to a desktop browser string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for the page fetch and for connecting to the package endpoint
    /// (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub request_timeout: Duration,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            page_host: default_page_host(),
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Download behavior configuration (destination, naming, progress reporting)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Download directory used when a request does not name one
    /// (None = the platform downloads directory)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub download_dir: Option<PathBuf>,

    /// How many `name (N).ext` candidates to probe before giving up on a
    /// collision-free name (default: 99)
    #[serde(default = "default_max_rename_attempts")]
    pub max_rename_attempts: u32,

    /// Minimum percentage advance between two broadcast progress events
    /// (default: 5). Transfer callbacks still see every chunk.
    #[serde(default = "default_progress_step_percent")]
    pub progress_step_percent: u8,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            max_rename_attempts: default_max_rename_attempts(),
            progress_step_percent: default_progress_step_percent(),
        }
    }
}

/// Main configuration for VsixDownloader
///
/// Fields are organized into logical sub-configs:
/// - [`marketplace`](MarketplaceConfig) - endpoints, user agent, timeouts
/// - [`download`](DownloadConfig) - destination directory, collision probing, progress steps
/// - [`server`](ServerIntegrationConfig) - REST API
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Marketplace endpoints and request behavior
    #[serde(default)]
    pub marketplace: MarketplaceConfig,

    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read '{}': {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        if self.marketplace.api_base.trim().is_empty() {
            return Err(Error::Config {
                message: "api_base must not be empty".to_string(),
                key: Some("api_base".to_string()),
            });
        }

        if self.marketplace.page_host.trim().is_empty() {
            return Err(Error::Config {
                message: "page_host must not be empty".to_string(),
                key: Some("page_host".to_string()),
            });
        }

        if self.marketplace.request_timeout.is_zero() {
            return Err(Error::Config {
                message: "request_timeout must be greater than zero".to_string(),
                key: Some("request_timeout".to_string()),
            });
        }

        if !(1..=100).contains(&self.download.progress_step_percent) {
            return Err(Error::Config {
                message: format!(
                    "progress_step_percent must be between 1 and 100, got {}",
                    self.download.progress_step_percent
                ),
                key: Some("progress_step_percent".to_string()),
            });
        }

        Ok(())
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6790)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Path of the settings file served by the settings endpoints
    /// (None = platform config directory)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub settings_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            settings_path: None,
        }
    }
}

fn default_page_host() -> String {
    "marketplace.visualstudio.com".to_string()
}

fn default_api_base() -> String {
    "https://marketplace.visualstudio.com/_apis/public/gallery".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_rename_attempts() -> u32 {
    99
}

fn default_progress_step_percent() -> u8 {
    5
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6790))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
