//! Version discovery from the marketplace item page
//!
//! The marketplace has no documented endpoint for "latest version of X" that
//! works without a gallery query, so the item page is fetched and scanned for
//! an embedded version token. The scan is an ordered list of patterns: the
//! first pattern that matches wins. When the page layout changes, add a
//! pattern with [`VersionPatterns::with_pattern`] rather than editing callers.

use super::http_client;
use crate::config::MarketplaceConfig;
use crate::error::{FetchError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Built-in patterns, tried in this order
const BUILTIN_PATTERNS: [&str; 3] = [
    // "version":"1.2.3"
    r#""version"\s*:\s*"(\d[\d.]*)""#,
    // "Version":"1.2.3" and other casings
    r#"(?i)"version"\s*:\s*"(\d[\d.]*)""#,
    // JSON-LD, meta tags, `Version: "1.2.3"`
    r#"(?i)version['"]?\s*:\s*['"]?(\d[\d.]*)"#,
];

static DEFAULT_PATTERNS: LazyLock<VersionPatterns> = LazyLock::new(VersionPatterns::default);

/// Source of an extension's current version
///
/// [`VersionFetcher`] is the production implementation; tests and alternative
/// front-ends can plug in their own.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Discover the current version for the extension behind `page_url`
    ///
    /// `page_url` is the original marketplace item URL.
    async fn fetch_version(&self, page_url: &str) -> std::result::Result<String, FetchError>;
}

/// Ordered list of version patterns
///
/// Each pattern must have one capture group holding the version.
#[derive(Clone, Debug)]
pub struct VersionPatterns {
    patterns: Vec<Regex>,
}

impl Default for VersionPatterns {
    fn default() -> Self {
        // Built-in patterns are constant and covered by tests
        let patterns = BUILTIN_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self { patterns }
    }
}

impl VersionPatterns {
    /// Start from an explicit pattern list (no built-ins)
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    /// Append a pattern, tried after all existing ones
    #[must_use]
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First version found in `body`, trying patterns in order
    pub fn find(&self, body: &str) -> Option<String> {
        self.patterns.iter().enumerate().find_map(|(index, pattern)| {
            let version = pattern.captures(body)?.get(1)?.as_str();
            debug!(pattern_index = index, version, "version pattern matched");
            Some(version.to_string())
        })
    }
}

/// Extract a version from page content using the built-in patterns
///
/// ```
/// use vsix_dl::marketplace::extract_version;
///
/// assert_eq!(extract_version(r#"{"version":"1.2.3"}"#).as_deref(), Some("1.2.3"));
/// assert_eq!(extract_version("no version here"), None);
/// ```
pub fn extract_version(body: &str) -> Option<String> {
    DEFAULT_PATTERNS.find(body)
}

/// Scrapes the marketplace item page for the current version
#[derive(Clone, Debug)]
pub struct VersionFetcher {
    client: reqwest::Client,
    timeout: Duration,
    patterns: VersionPatterns,
}

impl VersionFetcher {
    /// Build a fetcher with its own client using the configured user agent and timeout
    pub fn new(config: &MarketplaceConfig) -> Result<Self> {
        Ok(Self::with_client(http_client(config)?, config))
    }

    /// Build a fetcher on top of an existing client
    ///
    /// The configured request timeout is applied to every page fetch.
    pub fn with_client(client: reqwest::Client, config: &MarketplaceConfig) -> Self {
        Self {
            client,
            timeout: config.request_timeout,
            patterns: VersionPatterns::default(),
        }
    }

    /// Replace the pattern list
    #[must_use]
    pub fn with_patterns(mut self, patterns: VersionPatterns) -> Self {
        self.patterns = patterns;
        self
    }
}

#[async_trait]
impl VersionSource for VersionFetcher {
    async fn fetch_version(&self, page_url: &str) -> std::result::Result<String, FetchError> {
        debug!(url = page_url, "fetching marketplace page");

        let response = self
            .client
            .get(page_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::ExtensionNotFound);
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        self.patterns.find(&body).ok_or(FetchError::VersionNotFound)
    }
}
