//! Utility functions for file operations, path manipulation and progress math

use std::path::{Path, PathBuf};

/// Get a collision-free path for a file
///
/// If `path` does not exist it is returned unchanged. Otherwise `name (1).ext`,
/// `name (2).ext`, … are probed up to `max_attempts`. When every candidate is
/// taken the last probed name is returned, so the search is always bounded.
///
/// # Examples
///
/// ```
/// use vsix_dl::utils::get_unique_path;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/python-2024.3.1.vsix");
/// let unique = get_unique_path(path, 99).unwrap();
/// // If /tmp/python-2024.3.1.vsix exists, returns /tmp/python-2024.3.1 (1).vsix
/// // If that exists too, returns /tmp/python-2024.3.1 (2).vsix, etc.
/// ```
pub fn get_unique_path(path: &Path, max_attempts: u32) -> std::io::Result<PathBuf> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("cannot extract file stem from {}", path.display()),
        )
    })?;
    let extension = path.extension().and_then(|e| e.to_str());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut candidate = path.to_path_buf();
    for i in 1..=max_attempts {
        let new_name = match extension {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        candidate = parent.join(new_name);
        if !candidate.exists() {
            return Ok(candidate);
        }
        tracing::debug!(candidate = %candidate.display(), "name taken, probing next");
    }

    tracing::warn!(
        path = %path.display(),
        attempts = max_attempts,
        "no free file name found, reusing last probed name"
    );
    Ok(candidate)
}

/// Check that `path` exists and is a directory
pub async fn validate_directory(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.is_dir(),
        Err(_) => false,
    }
}

/// Create `path` (and its parents) if it does not exist yet
pub async fn ensure_directory(path: &Path) -> std::io::Result<()> {
    if validate_directory(path).await {
        return Ok(());
    }
    tokio::fs::create_dir_all(path).await
}

/// Platform default directory for downloaded packages
///
/// The user's downloads directory, else their documents directory, else the
/// current directory.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::document_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Format a byte count for display (`0 B`, `1 KB`, `1.5 MB`, …)
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Rounded completion percentage, clamped to 100
///
/// An unknown total (`content_length == 0`) always yields 0.
#[must_use]
pub fn progress_percentage(bytes_written: u64, content_length: u64) -> u8 {
    if content_length == 0 {
        return 0;
    }
    let percent = (bytes_written as f64 / content_length as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
