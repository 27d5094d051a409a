//! Core types for vsix-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Identity of an extension as named by the marketplace `itemName` parameter
///
/// Invariant: `item_name == format!("{publisher}.{extension_name}")`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ExtensionIdentifier {
    /// Publisher id, matches `[A-Za-z0-9_-]+`
    pub publisher: String,
    /// Extension name; may itself contain dots
    pub extension_name: String,
    /// `publisher.extension_name`
    pub item_name: String,
}

impl ExtensionIdentifier {
    /// Build an identifier from its two halves
    pub fn new(publisher: impl Into<String>, extension_name: impl Into<String>) -> Self {
        let publisher = publisher.into();
        let extension_name = extension_name.into();
        let item_name = format!("{publisher}.{extension_name}");
        Self {
            publisher,
            extension_name,
            item_name,
        }
    }
}

impl std::fmt::Display for ExtensionIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.item_name)
    }
}

/// Everything needed to download the latest package of an extension
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtensionDetails {
    /// Publisher id
    pub publisher: String,
    /// Extension name
    pub extension_name: String,
    /// `publisher.extension_name`
    pub item_name: String,
    /// Latest published version, e.g. "1.2.3"
    pub version: String,
    /// Direct package (vspackage) URL
    pub download_url: String,
    /// Suggested file name, `{extension_name}-{version}.vsix`
    pub file_name: String,
}

impl ExtensionDetails {
    /// The identifier part of these details
    pub fn identifier(&self) -> ExtensionIdentifier {
        ExtensionIdentifier {
            publisher: self.publisher.clone(),
            extension_name: self.extension_name.clone(),
            item_name: self.item_name.clone(),
        }
    }
}

/// Unique identifier for a running transfer (its job handle)
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct TransferId(pub u64);

impl TransferId {
    /// Get the inner value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TransferId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress of a single transfer
///
/// `content_length == 0` means the server did not announce a size; `percentage`
/// then stays at 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadProgress {
    /// Bytes written to disk so far
    pub bytes_written: u64,
    /// Announced total size (0 = unknown)
    pub content_length: u64,
    /// Rounded completion percentage, 0..=100
    pub percentage: u8,
}

/// Terminal outcome of one download attempt
///
/// Exactly one shape exists per attempt. Serializes as
/// `{"success": true, "file_path": …, "file_size": …}` or
/// `{"success": false, "error": …, "code": …}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "DownloadResultBody")]
pub enum DownloadResult {
    /// The package is on disk
    Success {
        /// Final location of the package
        file_path: PathBuf,
        /// Size on disk in bytes
        file_size: u64,
    },
    /// The attempt failed
    Failure {
        /// Human-readable message
        error: String,
        /// Machine-readable kind (e.g. "package_not_found")
        code: String,
    },
}

impl DownloadResult {
    /// Whether the package was saved
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadResult::Success { .. })
    }

    /// Final file path, if successful
    pub fn file_path(&self) -> Option<&std::path::Path> {
        match self {
            DownloadResult::Success { file_path, .. } => Some(file_path),
            DownloadResult::Failure { .. } => None,
        }
    }

    /// Error message, if failed
    pub fn error(&self) -> Option<&str> {
        match self {
            DownloadResult::Success { .. } => None,
            DownloadResult::Failure { error, .. } => Some(error),
        }
    }
}

impl From<crate::error::TransferError> for DownloadResult {
    fn from(error: crate::error::TransferError) -> Self {
        DownloadResult::Failure {
            code: error.code().to_string(),
            error: error.to_string(),
        }
    }
}

/// Flat wire shape of [`DownloadResult`]
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadResultBody {
    /// Whether the package was saved
    pub success: bool,
    /// Final location (success only)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub file_path: Option<PathBuf>,
    /// Size in bytes (success only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Human-readable message (failure only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable kind (failure only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<DownloadResult> for DownloadResultBody {
    fn from(result: DownloadResult) -> Self {
        match result {
            DownloadResult::Success {
                file_path,
                file_size,
            } => Self {
                success: true,
                file_path: Some(file_path),
                file_size: Some(file_size),
                error: None,
                code: None,
            },
            DownloadResult::Failure { error, code } => Self {
                success: false,
                file_path: None,
                file_size: None,
                error: Some(error),
                code: Some(code),
            },
        }
    }
}

/// Snapshot of an in-flight transfer
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferInfo {
    /// Job handle
    pub id: TransferId,
    /// Target file name as requested
    pub file_name: String,
    /// Package URL
    pub url: String,
    /// When the transfer was started
    pub started_at: DateTime<Utc>,
    /// Latest progress seen
    pub progress: DownloadProgress,
}

/// Event emitted while resolving and downloading extensions
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A resolution step started
    Resolving {
        /// The URL being resolved
        url: String,
        /// Step description, e.g. "Validating URL..."
        message: String,
    },

    /// The URL resolved to a downloadable package
    Resolved {
        /// Resolved details
        details: ExtensionDetails,
    },

    /// Resolution failed
    ResolveFailed {
        /// The URL that failed
        url: String,
        /// Error message
        error: String,
        /// Machine-readable kind
        code: String,
    },

    /// Bytes started flowing for a transfer
    TransferStarted {
        /// Transfer id
        id: TransferId,
        /// Requested file name
        file_name: String,
    },

    /// Transfer progress update
    Progress {
        /// Transfer id
        id: TransferId,
        /// Current progress
        progress: DownloadProgress,
    },

    /// Transfer finished and the file is on disk
    TransferComplete {
        /// Transfer id
        id: TransferId,
        /// Final location
        #[schema(value_type = String)]
        file_path: PathBuf,
        /// Size in bytes
        file_size: u64,
    },

    /// Transfer failed
    TransferFailed {
        /// Transfer id
        id: TransferId,
        /// Error message
        error: String,
        /// Machine-readable kind
        code: String,
    },

    /// Transfer was cancelled through its job handle
    TransferCancelled {
        /// Transfer id
        id: TransferId,
    },

    /// Downloader is shutting down
    Shutdown,
}
