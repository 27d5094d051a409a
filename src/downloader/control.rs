//! Transfer control: start, fetch, list, cancel.

use crate::error::{Error, Result};
use crate::transfer::{DownloadOptions, TransferJob};
use crate::types::{DownloadResult, Event, ExtensionDetails, TransferId, TransferInfo};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use super::VsixDownloader;

impl VsixDownloader {
    /// Start downloading a resolved package in the background
    ///
    /// The destination is, in order of precedence: `download_path`, the
    /// configured `download.download_dir`, the settings file's download path.
    ///
    /// Emits [`Event::TransferStarted`] when bytes start flowing, throttled
    /// [`Event::Progress`] updates (every `progress_step_percent`, plus 100%),
    /// and exactly one of [`Event::TransferComplete`], [`Event::TransferFailed`]
    /// or [`Event::TransferCancelled`]. The terminal event is emitted even if
    /// the returned job is never awaited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) has begun.
    /// Transfer failures are reported through the job's [`DownloadResult`].
    pub async fn download(
        &self,
        details: &ExtensionDetails,
        download_path: Option<PathBuf>,
    ) -> Result<TransferJob> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let download_path = match download_path {
            Some(path) => Some(path),
            None if self.config.download.download_dir.is_some() => None,
            None => Some(self.settings.load().await.download_path),
        };

        let step = self.config.download.progress_step_percent;
        let url = details.download_url.clone();
        let file_name = details.file_name.clone();

        let job = self
            .transfer
            .start_with(|id| {
                let mut options = DownloadOptions::new(url, file_name.clone());
                options.download_path = download_path;

                let begin_tx = self.event_tx.clone();
                let progress_tx = self.event_tx.clone();
                let mut last_emitted: Option<u8> = None;

                options
                    .on_begin(move || {
                        begin_tx.send(Event::TransferStarted { id, file_name }).ok();
                    })
                    .on_progress(move |progress| {
                        let due = match last_emitted {
                            None => true,
                            Some(last) => {
                                progress.percentage >= last.saturating_add(step)
                                    || (progress.percentage == 100 && last < 100)
                            }
                        };
                        if due {
                            last_emitted = Some(progress.percentage);
                            progress_tx.send(Event::Progress { id, progress }).ok();
                        }
                    })
            })
            .await?;

        let id = job.id();
        let downloader = self.clone();
        let handle = tokio::spawn(async move {
            let result = job.wait().await;
            downloader.emit_terminal_event(id, &result);
            result
        });

        Ok(TransferJob::new(id, handle))
    }

    /// Resolve `url` and download its package, waiting for the result
    ///
    /// Resolution failures are returned as `Err`; once a transfer has started
    /// every outcome is a [`DownloadResult`].
    pub async fn fetch(&self, url: &str, download_path: Option<PathBuf>) -> Result<DownloadResult> {
        let details = self.resolve(url).await?;
        let job = self.download(&details, download_path).await?;
        Ok(job.wait().await)
    }

    /// Cancel a running transfer
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no transfer with this id is running.
    pub async fn cancel(&self, id: TransferId) -> Result<()> {
        if self.transfer.cancel(id).await {
            tracing::info!(transfer_id = id.0, "transfer cancellation requested");
            Ok(())
        } else {
            Err(Error::NotFound(format!("transfer {}", id)))
        }
    }

    /// Snapshot of running transfers, oldest first
    pub async fn active_transfers(&self) -> Vec<TransferInfo> {
        self.transfer.active_transfers().await
    }

    fn emit_terminal_event(&self, id: TransferId, result: &DownloadResult) {
        let event = match result {
            DownloadResult::Success {
                file_path,
                file_size,
            } => Event::TransferComplete {
                id,
                file_path: file_path.clone(),
                file_size: *file_size,
            },
            DownloadResult::Failure { code, .. } if code == "cancelled" => {
                Event::TransferCancelled { id }
            }
            DownloadResult::Failure { error, code } => Event::TransferFailed {
                id,
                error: error.clone(),
                code: code.clone(),
            },
        };
        self.emit_event(event);
    }
}
