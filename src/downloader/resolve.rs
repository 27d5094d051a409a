//! URL resolution with progress events.

use crate::error::{Result, ToHttpStatus};
use crate::types::{Event, ExtensionDetails};

use super::VsixDownloader;

impl VsixDownloader {
    /// Resolve a marketplace URL to its latest downloadable package
    ///
    /// Emits [`Event::Resolving`] before each step, then either
    /// [`Event::Resolved`] or [`Event::ResolveFailed`].
    pub async fn resolve(&self, url: &str) -> Result<ExtensionDetails> {
        let result = self
            .resolver
            .resolve(url, |message| {
                self.emit_event(Event::Resolving {
                    url: url.to_string(),
                    message: message.to_string(),
                })
            })
            .await;

        match &result {
            Ok(details) => self.emit_event(Event::Resolved {
                details: details.clone(),
            }),
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to resolve extension");
                self.emit_event(Event::ResolveFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                    code: e.error_code().to_string(),
                });
            }
        }

        result
    }
}
