//! Application state for the API server

use crate::{Config, VsixDownloader};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
#[derive(Clone)]
pub struct AppState {
    /// The downloader the handlers drive
    pub downloader: Arc<VsixDownloader>,

    /// Configuration the router was built with
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(downloader: Arc<VsixDownloader>, config: Arc<Config>) -> Self {
        Self { downloader, config }
    }
}
