//! Error types for vsix-dl
//!
//! This module provides the error handling for the library:
//! - Domain-specific error types (URL parsing, version fetching, file transfer)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for vsix-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vsix-dl
///
/// Each variant carries enough context to be shown to a user as-is; the
/// machine-readable kind is available through [`ToHttpStatus::error_code`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "request_timeout")
        key: Option<String>,
    },

    /// The marketplace URL could not be turned into an extension identifier
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The extension version could not be discovered
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Saving the package to disk failed
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Settings could not be validated or persisted
    #[error("{0}")]
    Settings(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found (e.g. unknown transfer id)
    #[error("not found: {0}")]
    NotFound(String),

    /// Shutdown in progress - not accepting new transfers
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// Network error outside of a page fetch or transfer (e.g. building the HTTP client)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Reasons a pasted URL is rejected before any network access happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing (or only whitespace) was entered
    #[error("Please enter a URL.")]
    EmptyUrl,

    /// Host, `/items` path or `itemName=` key is missing
    #[error(
        "Not a valid VS Code Marketplace URL. Expected format: https://marketplace.visualstudio.com/items?itemName=publisher.extension"
    )]
    NotMarketplaceUrl,

    /// The URL has no query string after `?`
    #[error("The URL has no query string. Expected \"?itemName=publisher.extension\".")]
    MissingQueryString,

    /// The query string has no usable `itemName` parameter
    #[error("Could not find \"itemName\" parameter in the URL.")]
    MissingItemName,

    /// `itemName` is not of the form `publisher.extensionName`
    #[error("Invalid extension identifier: \"{item_name}\". Expected format: publisher.extensionName")]
    MalformedItemName {
        /// The raw `itemName` value
        item_name: String,
    },

    /// The publisher part contains characters outside `[A-Za-z0-9_-]`
    #[error("Invalid publisher \"{publisher}\": only letters, digits, '-' and '_' are allowed")]
    InvalidPublisher {
        /// The rejected publisher
        publisher: String,
    },
}

/// Failures while discovering an extension's current version
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The marketplace page answered 404
    #[error("Extension not found. Please check the URL is correct.")]
    ExtensionNotFound,

    /// The marketplace page answered with another non-success status
    #[error("Failed to fetch extension page (HTTP {status}).")]
    HttpStatus {
        /// HTTP status code
        status: u16,
    },

    /// None of the version patterns matched the page content
    #[error("Could not find version information. The marketplace page structure may have changed.")]
    VersionNotFound,

    /// Connection, timeout or body-read failure
    #[error("Network error while fetching extension info: {0}")]
    Network(String),
}

/// Failures while saving a package to disk
#[derive(Debug, Error)]
pub enum TransferError {
    /// The destination directory is missing or is not a directory
    #[error("Download directory does not exist or is not accessible: {}", path.display())]
    DirectoryNotAccessible {
        /// The directory that was rejected
        path: PathBuf,
    },

    /// The server reported success but no file ended up on disk
    #[error("Download completed but file was not found on disk.")]
    IncompleteWrite {
        /// Where the file was expected
        path: PathBuf,
    },

    /// The package endpoint answered 404
    #[error(
        "Extension not found at the download URL. It may have been removed or the version is incorrect."
    )]
    PackageNotFound,

    /// The package endpoint answered 403
    #[error(
        "Access denied. The extension may require authentication or is not publicly available."
    )]
    AccessDenied,

    /// The package endpoint answered with any other non-200 status
    #[error("Download failed with HTTP status {status}.")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
    },

    /// The transfer was cancelled through its job handle
    #[error("Download failed: download cancelled")]
    Cancelled,

    /// Transport failure while fetching the package
    #[error("Download failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Filesystem failure while writing the package
    #[error("Download failed: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// Machine-readable kind of this transfer error
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::DirectoryNotAccessible { .. } => "directory_not_accessible",
            TransferError::IncompleteWrite { .. } => "incomplete_write",
            TransferError::PackageNotFound => "package_not_found",
            TransferError::AccessDenied => "access_denied",
            TransferError::UnexpectedStatus { .. } => "unexpected_status",
            TransferError::Cancelled => "cancelled",
            TransferError::Network(_) => "network_error",
            TransferError::Io(_) => "io_error",
        }
    }
}

/// API error response format
///
/// Follows a standard format with machine-readable error codes,
/// human-readable messages, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_publisher",
///     "message": "Invalid publisher \"ms python\": only letters, digits, '-' and '_' are allowed",
///     "details": {
///       "publisher": "ms python"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "version_not_found")
    pub code: String,

    /// Human-readable error message, suitable for displaying to end users
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Parse(_) => 400,
            Error::Settings(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,
            Error::Fetch(FetchError::ExtensionNotFound) => 404,
            Error::Transfer(TransferError::PackageNotFound) => 404,

            // 422 Unprocessable Entity - the destination cannot be used
            Error::Transfer(TransferError::DirectoryNotAccessible { .. }) => 422,

            // 409 Conflict - transfer no longer running
            Error::Transfer(TransferError::Cancelled) => 409,

            // 502 Bad Gateway - marketplace misbehaved
            Error::Fetch(_) => 502,
            Error::Transfer(TransferError::AccessDenied) => 502,
            Error::Transfer(TransferError::UnexpectedStatus { .. }) => 502,
            Error::Transfer(TransferError::Network(_)) => 502,
            Error::Network(_) => 502,

            // 500 Internal Server Error - Server-side issues
            Error::Transfer(TransferError::IncompleteWrite { .. }) => 500,
            Error::Transfer(TransferError::Io(_)) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Parse(e) => match e {
                ParseError::EmptyUrl => "empty_url",
                ParseError::NotMarketplaceUrl => "not_marketplace_url",
                ParseError::MissingQueryString => "missing_query_string",
                ParseError::MissingItemName => "missing_item_name",
                ParseError::MalformedItemName { .. } => "malformed_item_name",
                ParseError::InvalidPublisher { .. } => "invalid_publisher",
            },
            Error::Fetch(e) => match e {
                FetchError::ExtensionNotFound => "extension_not_found",
                FetchError::HttpStatus { .. } => "http_error",
                FetchError::VersionNotFound => "version_not_found",
                FetchError::Network(_) => "network_error",
            },
            Error::Transfer(e) => e.code(),
            Error::Settings(_) => "settings_error",
            Error::Io(_) => "io_error",
            Error::NotFound(_) => "not_found",
            Error::ShuttingDown => "shutting_down",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Parse(ParseError::MalformedItemName { item_name }) => {
                Some(serde_json::json!({
                    "item_name": item_name,
                }))
            }
            Error::Parse(ParseError::InvalidPublisher { publisher }) => {
                Some(serde_json::json!({
                    "publisher": publisher,
                }))
            }
            Error::Fetch(FetchError::HttpStatus { status })
            | Error::Transfer(TransferError::UnexpectedStatus { status }) => {
                Some(serde_json::json!({
                    "status": status,
                }))
            }
            Error::Transfer(TransferError::DirectoryNotAccessible { path })
            | Error::Transfer(TransferError::IncompleteWrite { path }) => {
                Some(serde_json::json!({
                    "path": path,
                }))
            }
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
