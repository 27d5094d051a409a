//! Persisted front-end settings
//!
//! Settings live in a small pretty-printed JSON file. Missing keys fall back
//! to their defaults, so files written by older versions keep loading, and a
//! missing or unreadable file simply yields the defaults. The core only reads
//! [`AppSettings::download_path`]; the remaining flags are for front-ends.

use crate::error::{Error, Result};
use crate::utils::{default_download_dir, ensure_directory};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use utoipa::ToSchema;

/// File name of the settings file
pub const SETTINGS_FILE_NAME: &str = "vsix-downloader-settings.json";

/// Color theme preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme
    #[default]
    Light,
    /// Dark theme
    Dark,
    /// Follow the operating system
    System,
}

/// User-editable application settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppSettings {
    /// Directory packages are saved into
    #[serde(default = "default_download_dir", alias = "downloadPath")]
    #[schema(value_type = String)]
    pub download_path: PathBuf,

    /// Color theme (default: light)
    #[serde(default)]
    pub theme: Theme,

    /// Open the download folder after a successful download (default: false)
    #[serde(default, alias = "autoOpenAfterDownload")]
    pub auto_open_after_download: bool,

    /// Ask before starting a download (default: false)
    #[serde(default, alias = "confirmBeforeDownload")]
    pub confirm_before_download: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            download_path: default_download_dir(),
            theme: Theme::default(),
            auto_open_after_download: false,
            confirm_before_download: false,
        }
    }
}

/// Check that `path` can be used as a download directory
///
/// Returns the path on success, or [`Error::Settings`] with a message suitable
/// for showing next to the input field.
pub async fn validate_download_path(path: &Path) -> Result<PathBuf> {
    if path.to_string_lossy().trim().is_empty() {
        return Err(Error::Settings("Path cannot be empty.".to_string()));
    }

    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(path.to_path_buf()),
        Ok(_) => Err(Error::Settings("Path is not a directory.".to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::Settings("Directory does not exist.".to_string()))
        }
        Err(_) => Err(Error::Settings("Unable to access directory.".to_string())),
    }
}

/// Loads and saves [`AppSettings`] at a fixed path
///
/// Read-modify-write operations are serialized per store.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    pub(crate) lock: Mutex<()>,
}

impl SettingsStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `{config dir}/vsix-dl/vsix-downloader-settings.json`, if the platform has a config dir
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vsix-dl").join(SETTINGS_FILE_NAME))
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings
    ///
    /// Never fails: a missing file yields defaults, and so does a file that
    /// cannot be read or parsed (with a warning).
    pub async fn load(&self) -> AppSettings {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Overwrite the settings file
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write(settings).await
    }

    /// Load, apply `change`, save, and return the result
    pub async fn update<F>(&self, change: F) -> Result<AppSettings>
    where
        F: FnOnce(&mut AppSettings) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut settings = self.read().await;
        change(&mut settings);
        self.write(&settings).await?;
        Ok(settings)
    }

    /// Write and return the defaults
    pub async fn reset(&self) -> Result<AppSettings> {
        let _guard = self.lock.lock().await;
        let defaults = AppSettings::default();
        self.write(&defaults).await?;
        Ok(defaults)
    }

    async fn read(&self) -> AppSettings {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return AppSettings::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read settings, using defaults");
                return AppSettings::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "invalid settings file, using defaults");
                AppSettings::default()
            }
        }
    }

    async fn write(&self, settings: &AppSettings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            ensure_directory(parent).await?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, content).await?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
