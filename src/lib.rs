//! # vsix-dl
//!
//! Resolve VS Code Marketplace item URLs to their latest `.vsix` package and
//! download it to disk.
//!
//! ## Design Philosophy
//!
//! vsix-dl is designed to be:
//! - **Library-first** - Front-ends (desktop shells, the bundled REST API) drive one facade
//! - **Event-driven** - Consumers subscribe to resolution and transfer events
//! - **Sensible defaults** - Works out of the box against the public marketplace
//!
//! ## Quick Start
//!
//! ```no_run
//! use vsix_dl::{Config, Event, VsixDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = VsixDownloader::new(Config::default())?;
//!
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let Event::Progress { progress, .. } = event {
//!                 println!("{}%", progress.percentage);
//!             }
//!         }
//!     });
//!
//!     let details = downloader
//!         .resolve("https://marketplace.visualstudio.com/items?itemName=ms-python.python")
//!         .await?;
//!     let result = downloader.download(&details, None).await?.wait().await;
//!     println!("{:?}", result);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Library facade (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Marketplace URL parsing, version discovery and package links
pub mod marketplace;
/// Front-end settings persistence
pub mod settings;
/// Streaming package downloads
pub mod transfer;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use downloader::VsixDownloader;
pub use error::{
    ApiError, Error, ErrorDetail, FetchError, ParseError, Result, ToHttpStatus, TransferError,
};
pub use marketplace::{ExtensionResolver, VersionFetcher, VersionSource};
pub use settings::{AppSettings, SettingsStore, Theme};
pub use transfer::{DownloadOptions, FileTransfer, TransferJob};
pub use types::{
    DownloadProgress, DownloadResult, Event, ExtensionDetails, ExtensionIdentifier, TransferId,
    TransferInfo,
};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's `shutdown()` method,
/// which cancels running transfers and removes their partial files.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use vsix_dl::{Config, VsixDownloader, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = Arc::new(VsixDownloader::new(Config::default())?);
///     let _api = downloader.spawn_api_server();
///
///     run_with_shutdown(&downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: &VsixDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
