//! Library facade split into focused submodules.
//!
//! The `VsixDownloader` struct and its methods are organized by domain:
//! - [`resolve`] - URL resolution with progress events
//! - [`control`] - Starting, fetching, listing and cancelling transfers
//! - [`lifecycle`] - Shutdown coordination

mod control;
mod lifecycle;
mod resolve;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::Result;
use crate::marketplace::{ExtensionResolver, VersionFetcher, VersionSource, http_client};
use crate::settings::{SETTINGS_FILE_NAME, SettingsStore};
use crate::transfer::FileTransfer;
use crate::types::Event;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::broadcast;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Main downloader instance (cloneable - all fields are Arc-wrapped or cheap to clone)
///
/// Owns the configuration, one HTTP client shared by page fetches and package
/// transfers, the resolver, the transfer engine, the settings store and the
/// event channel. Front-ends hold one of these; nothing is process-global.
#[derive(Clone)]
pub struct VsixDownloader {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// URL → package resolution pipeline
    pub(crate) resolver: ExtensionResolver,
    /// Transfer engine (owns the running-transfer map)
    pub(crate) transfer: FileTransfer,
    /// Front-end settings file
    pub(crate) settings: Arc<SettingsStore>,
    /// Flag to indicate whether new transfers are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl VsixDownloader {
    /// Create a new VsixDownloader instance
    ///
    /// Validates the configuration and builds the shared HTTP client. Versions
    /// are discovered by scraping the marketplace page with [`VersionFetcher`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vsix_dl::{Config, VsixDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = VsixDownloader::new(Config::default())?;
    ///     let result = downloader
    ///         .fetch("https://marketplace.visualstudio.com/items?itemName=ms-python.python", None)
    ///         .await?;
    ///     println!("{:?}", result);
    ///     Ok(())
    /// }
    /// ```
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = http_client(&config.marketplace)?;
        let fetcher = VersionFetcher::with_client(client.clone(), &config.marketplace);
        Ok(Self::build(config, client, Arc::new(fetcher)))
    }

    /// Create a downloader that discovers versions through a custom source
    pub fn with_version_source(config: Config, source: Arc<dyn VersionSource>) -> Result<Self> {
        config.validate()?;
        let client = http_client(&config.marketplace)?;
        Ok(Self::build(config, client, source))
    }

    fn build(config: Config, client: reqwest::Client, source: Arc<dyn VersionSource>) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let settings_path = config
            .server
            .api
            .settings_path
            .clone()
            .or_else(SettingsStore::default_location)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));

        let resolver = ExtensionResolver::new(source, &config.marketplace);
        let transfer = FileTransfer::with_client(client, &config);

        tracing::debug!(
            settings = %settings_path.display(),
            api_base = %config.marketplace.api_base,
            "downloader initialized"
        );

        Self {
            event_tx,
            config: Arc::new(config),
            resolver,
            transfer,
            settings: Arc::new(SettingsStore::new(settings_path)),
            accepting_new: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Subscribe to resolution and transfer events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// Events are buffered, but if a subscriber falls behind by more than 1000 events,
    /// it will receive a `RecvError::Lagged` error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vsix_dl::{Config, Event, VsixDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = VsixDownloader::new(Config::default())?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             if let Event::Progress { id, progress } = event {
    ///                 println!("transfer {id}: {}%", progress.percentage);
    ///             }
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// The settings store front-ends read and write
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Spawn the REST API server in a background task
    ///
    /// Listens on the configured bind address (default: 127.0.0.1:6790).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
