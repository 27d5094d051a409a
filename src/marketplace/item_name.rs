//! Marketplace URL validation and `itemName` extraction

use crate::error::ParseError;
use crate::types::ExtensionIdentifier;

/// Parse a marketplace item URL into an [`ExtensionIdentifier`]
///
/// Checks run in a fixed order and each failure has its own [`ParseError`]
/// variant. `itemName` is split at its first `.` only, so extension names
/// containing dots survive intact. Query parameters other than `itemName` are
/// ignored. No I/O happens here.
///
/// # Examples
///
/// ```
/// use vsix_dl::marketplace::parse_marketplace_url;
///
/// let id = parse_marketplace_url(
///     "https://marketplace.visualstudio.com/items?itemName=foo.bar.baz",
///     "marketplace.visualstudio.com",
/// )
/// .unwrap();
/// assert_eq!(id.publisher, "foo");
/// assert_eq!(id.extension_name, "bar.baz");
/// ```
pub fn parse_marketplace_url(
    url: &str,
    page_host: &str,
) -> Result<ExtensionIdentifier, ParseError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyUrl);
    }

    let lowered = trimmed.to_lowercase();
    if !lowered.contains(&page_host.to_lowercase())
        || !lowered.contains("/items")
        || !lowered.contains("itemname=")
    {
        return Err(ParseError::NotMarketplaceUrl);
    }

    let query = trimmed
        .split_once('?')
        .map(|(_, rest)| rest.split('#').next().unwrap_or_default())
        .filter(|q| !q.is_empty())
        .ok_or(ParseError::MissingQueryString)?;

    let item_name = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "itemName")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ParseError::MissingItemName)?;

    let (publisher, extension_name) = match item_name.split_once('.') {
        Some((p, e)) if !p.is_empty() && !e.is_empty() => (p, e),
        _ => return Err(ParseError::MalformedItemName { item_name }),
    };

    if !is_valid_publisher(publisher) {
        return Err(ParseError::InvalidPublisher {
            publisher: publisher.to_string(),
        });
    }

    Ok(ExtensionIdentifier::new(publisher, extension_name))
}

fn is_valid_publisher(publisher: &str) -> bool {
    !publisher.is_empty()
        && publisher
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
