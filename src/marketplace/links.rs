//! Package URL and file name construction

/// Compose the vspackage download URL for one extension version
///
/// `{api_base}/publishers/{publisher}/vsextensions/{extension_name}/{version}/vspackage`.
/// Inputs are not validated.
pub fn build_download_url(
    api_base: &str,
    publisher: &str,
    extension_name: &str,
    version: &str,
) -> String {
    format!(
        "{}/publishers/{}/vsextensions/{}/{}/vspackage",
        api_base.trim_end_matches('/'),
        publisher,
        extension_name,
        version
    )
}

/// File name a downloaded package is saved under: `{extension_name}-{version}.vsix`
pub fn build_file_name(extension_name: &str, version: &str) -> String {
    format!("{}-{}.vsix", extension_name, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = "https://marketplace.visualstudio.com/_apis/public/gallery";

    #[test]
    fn download_url_follows_gallery_template() {
        assert_eq!(
            build_download_url(API, "ms-python", "python", "2024.3.1"),
            "https://marketplace.visualstudio.com/_apis/public/gallery/publishers/ms-python/vsextensions/python/2024.3.1/vspackage"
        );
    }

    #[test]
    fn trailing_slash_on_api_base_is_not_doubled() {
        let url = build_download_url(&format!("{API}/"), "a", "b", "1.0.0");
        assert!(url.contains("/gallery/publishers/a/"));
    }

    #[test]
    fn file_name_keeps_dotted_extension_names() {
        assert_eq!(build_file_name("python", "2024.3.1"), "python-2024.3.1.vsix");
        assert_eq!(build_file_name("vscode.yaml", "1.0.0"), "vscode.yaml-1.0.0.vsix");
    }
}
