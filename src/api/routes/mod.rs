//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`downloads`] - Resolution and transfers
//! - [`settings`] - Front-end settings
//! - [`system`] - Health, events, OpenAPI

use crate::types::{ExtensionDetails, TransferId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod downloads;
mod settings;
mod system;

pub use downloads::*;
pub use settings::*;
pub use system::*;

/// Request body for POST /resolve
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ResolveRequest {
    /// Marketplace item page URL
    pub url: String,
}

/// Request body for POST /downloads
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadRequest {
    /// Marketplace item page URL
    pub url: String,
    /// Directory to save into (defaults to the configured or saved directory)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub download_path: Option<PathBuf>,
}

/// Response for POST /downloads
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadResponse {
    /// Handle for the new transfer
    pub id: TransferId,
    /// What is being downloaded
    pub details: ExtensionDetails,
}
