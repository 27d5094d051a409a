//! URL → version → package link pipeline

use super::{
    VersionFetcher, VersionSource, build_download_url, build_file_name, parse_marketplace_url,
};
use crate::config::{Config, MarketplaceConfig};
use crate::error::Result;
use crate::types::ExtensionDetails;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves marketplace item URLs to downloadable packages
///
/// Every call is independent: nothing is cached and nothing is retried.
#[derive(Clone)]
pub struct ExtensionResolver {
    source: Arc<dyn VersionSource>,
    page_host: String,
    api_base: String,
}

impl ExtensionResolver {
    /// Create a resolver around any version source
    pub fn new(source: Arc<dyn VersionSource>, config: &MarketplaceConfig) -> Self {
        Self {
            source,
            page_host: config.page_host.clone(),
            api_base: config.api_base.clone(),
        }
    }

    /// Create a resolver that scrapes the marketplace page with [`VersionFetcher`]
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = VersionFetcher::new(&config.marketplace)?;
        Ok(Self::new(Arc::new(fetcher), &config.marketplace))
    }

    /// Resolve `url` to [`ExtensionDetails`]
    ///
    /// `on_progress` receives a short message before each step, in order:
    /// `"Validating URL..."` then `"Fetching version for {extension}..."`.
    /// The first failing step aborts the pipeline and its error is returned.
    pub async fn resolve<F>(&self, url: &str, mut on_progress: F) -> Result<ExtensionDetails>
    where
        F: FnMut(&str) + Send,
    {
        on_progress("Validating URL...");
        let identifier = parse_marketplace_url(url, &self.page_host)?;
        debug!(item_name = %identifier.item_name, "parsed marketplace URL");

        on_progress(&format!(
            "Fetching version for {}...",
            identifier.extension_name
        ));
        // The page URL, not the gallery API, carries the version token
        let version = self.source.fetch_version(url.trim()).await?;

        let download_url = build_download_url(
            &self.api_base,
            &identifier.publisher,
            &identifier.extension_name,
            &version,
        );
        let file_name = build_file_name(&identifier.extension_name, &version);

        info!(
            item_name = %identifier.item_name,
            version = %version,
            "resolved extension"
        );

        Ok(ExtensionDetails {
            publisher: identifier.publisher,
            extension_name: identifier.extension_name,
            item_name: identifier.item_name,
            version,
            download_url,
            file_name,
        })
    }
}

impl std::fmt::Debug for ExtensionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionResolver")
            .field("page_host", &self.page_host)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}
