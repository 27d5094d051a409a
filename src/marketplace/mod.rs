//! VS Code Marketplace resolution
//!
//! Turns a pasted marketplace item URL into everything needed to download the
//! extension's latest package:
//!
//! 1. [`parse_marketplace_url`] - validate the URL and extract `publisher.extension`
//! 2. [`VersionSource`] - discover the current version (by default [`VersionFetcher`],
//!    which scrapes the item page)
//! 3. [`build_download_url`] / [`build_file_name`] - compose the vspackage URL and file name
//!
//! [`ExtensionResolver`] runs the three steps in order and reports progress.
//!
//! ## Usage
//!
//! ```no_run
//! use vsix_dl::config::Config;
//! use vsix_dl::marketplace::ExtensionResolver;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ExtensionResolver::from_config(&Config::default())?;
//! let details = resolver
//!     .resolve(
//!         "https://marketplace.visualstudio.com/items?itemName=ms-python.python",
//!         |message| println!("{message}"),
//!     )
//!     .await?;
//! println!("{} -> {}", details.item_name, details.download_url);
//! # Ok(())
//! # }
//! ```

mod item_name;
mod links;
mod resolver;
mod version;

pub use item_name::parse_marketplace_url;
pub use links::{build_download_url, build_file_name};
pub use resolver::ExtensionResolver;
pub use version::{VersionFetcher, VersionPatterns, VersionSource, extract_version};

use crate::config::MarketplaceConfig;
use crate::error::Result;

/// Build the HTTP client shared by page fetches and package transfers
///
/// Sends the configured browser-like `User-Agent` and bounds connection setup
/// by the request timeout. Whole-request timeouts are applied per request,
/// since package bodies can take arbitrarily long.
pub fn http_client(config: &MarketplaceConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.request_timeout)
        .build()?;
    Ok(client)
}
