//! Package transfer to local storage
//!
//! [`FileTransfer`] saves one package per call:
//!
//! 1. Pick the destination directory (request, config, or platform default)
//! 2. Reject it unless it exists and is a directory
//! 3. Find a collision-free file name (`name (N).vsix`, bounded)
//! 4. Check the HTTP status before anything is written
//! 5. Stream the body into `{name}.part`, reporting progress after every chunk
//! 6. Rename onto the final name and stat it
//!
//! Every failure is folded into [`DownloadResult::Failure`]; nothing is
//! returned as `Err`. Running transfers can be listed and cancelled by id.

use crate::config::Config;
use crate::error::{Error, Result, ToHttpStatus, TransferError};
use crate::types::{DownloadProgress, DownloadResult, TransferId, TransferInfo};
use crate::utils::{
    default_download_dir, get_unique_path, progress_percentage, validate_directory,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;


/// Called once, right before the first body byte is written
pub type BeginCallback = Box<dyn FnOnce() + Send>;

/// Called after every chunk written to disk, in order
pub type ProgressCallback = Box<dyn FnMut(DownloadProgress) + Send>;

/// What to download and where
pub struct DownloadOptions {
    /// Package URL
    pub url: String,
    /// Desired file name; may be changed to avoid collisions
    pub file_name: String,
    /// Destination directory (None = configured or platform default)
    pub download_path: Option<PathBuf>,
    /// Invoked once when bytes start flowing
    pub on_begin: Option<BeginCallback>,
    /// Invoked after every chunk
    pub on_progress: Option<ProgressCallback>,
}

impl DownloadOptions {
    /// Options with no destination override and no callbacks
    pub fn new(url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_name: file_name.into(),
            download_path: None,
            on_begin: None,
            on_progress: None,
        }
    }

    /// Save into `path` instead of the default directory
    #[must_use]
    pub fn download_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_path = Some(path.into());
        self
    }

    /// Set the begin callback
    #[must_use]
    pub fn on_begin(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_begin = Some(Box::new(callback));
        self
    }

    /// Set the progress callback
    #[must_use]
    pub fn on_progress(mut self, callback: impl FnMut(DownloadProgress) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("url", &self.url)
            .field("file_name", &self.file_name)
            .field("download_path", &self.download_path)
            .field("on_begin", &self.on_begin.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// Running byte count for one transfer
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressTracker {
    content_length: u64,
    bytes_written: u64,
}

impl ProgressTracker {
    /// Start tracking a body of `content_length` bytes (0 = unknown)
    pub fn new(content_length: u64) -> Self {
        Self {
            content_length,
            bytes_written: 0,
        }
    }

    /// Record `bytes` more written and return the new progress
    pub fn advance(&mut self, bytes: u64) -> DownloadProgress {
        self.bytes_written = self.bytes_written.saturating_add(bytes);
        self.current()
    }

    /// Progress so far
    pub fn current(&self) -> DownloadProgress {
        DownloadProgress {
            bytes_written: self.bytes_written,
            content_length: self.content_length,
            percentage: progress_percentage(self.bytes_written, self.content_length),
        }
    }
}

/// Handle to a started transfer
#[derive(Debug)]
pub struct TransferJob {
    id: TransferId,
    handle: JoinHandle<DownloadResult>,
}

impl TransferJob {
    pub(crate) fn new(id: TransferId, handle: JoinHandle<DownloadResult>) -> Self {
        Self { id, handle }
    }

    /// Id to pass to [`FileTransfer::cancel`]
    pub fn id(&self) -> TransferId {
        self.id
    }

    /// Wait for the terminal result
    pub async fn wait(self) -> DownloadResult {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(transfer_id = self.id.0, error = %e, "transfer task failed");
                DownloadResult::Failure {
                    error: format!("Download failed: {}", e),
                    code: "internal_error".to_string(),
                }
            }
        }
    }
}

/// Bookkeeping for one in-flight transfer
struct ActiveTransfer {
    token: CancellationToken,
    info: TransferInfo,
}

type ActiveMap = Arc<Mutex<HashMap<TransferId, ActiveTransfer>>>;

/// Downloads packages to disk
///
/// Cheap to clone; clones share the same set of running transfers.
#[derive(Clone)]
pub struct FileTransfer {
    client: reqwest::Client,
    default_dir: Option<PathBuf>,
    max_rename_attempts: u32,
    next_id: Arc<AtomicU64>,
    active: ActiveMap,
    /// Set by [`FileTransfer::close`] while `active` is locked
    closed: Arc<AtomicBool>,
}

impl FileTransfer {
    /// Create a transfer engine with its own HTTP client
    pub fn new(config: &Config) -> Result<Self> {
        let client = crate::marketplace::http_client(&config.marketplace)?;
        Ok(Self::with_client(client, config))
    }

    /// Create a transfer engine on top of an existing client
    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            default_dir: config.download.download_dir.clone(),
            max_rename_attempts: config.download.max_rename_attempts,
            next_id: Arc::new(AtomicU64::new(1)),
            active: Arc::new(Mutex::new(HashMap::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Download and wait for the result
    pub async fn download(&self, options: DownloadOptions) -> DownloadResult {
        match self.start(options).await {
            Ok(job) => job.wait().await,
            Err(e) => DownloadResult::Failure {
                error: e.to_string(),
                code: e.error_code().to_string(),
            },
        }
    }

    /// Start a transfer in the background and return its job handle
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] once [`close`](Self::close) has been called.
    pub async fn start(&self, options: DownloadOptions) -> Result<TransferJob> {
        self.start_with(|_| options).await
    }

    /// Like [`start`](Self::start), but the options are built once the id is known
    ///
    /// Lets callbacks tag what they report with the transfer's id.
    pub async fn start_with<F>(&self, build: F) -> Result<TransferJob>
    where
        F: FnOnce(TransferId) -> DownloadOptions,
    {
        let token = CancellationToken::new();

        // `closed` is read under the lock so `close` cannot slip in between
        // the check and the insert.
        let (id, options) = {
            let mut active = self.active.lock().await;
            if self.closed.load(Ordering::SeqCst) {
                return Err(Error::ShuttingDown);
            }

            let id = TransferId(self.next_id.fetch_add(1, Ordering::Relaxed));
            let options = build(id);
            active.insert(
                id,
                ActiveTransfer {
                    token: token.clone(),
                    info: TransferInfo {
                        id,
                        file_name: options.file_name.clone(),
                        url: options.url.clone(),
                        started_at: chrono::Utc::now(),
                        progress: DownloadProgress::default(),
                    },
                },
            );
            (id, options)
        };

        tracing::info!(transfer_id = id.0, url = %options.url, "transfer started");

        let this = self.clone();
        let handle = tokio::spawn(async move {
            let result = match this.run(id, options, &token).await {
                Ok((file_path, file_size)) => {
                    tracing::info!(
                        transfer_id = id.0,
                        path = %file_path.display(),
                        size = file_size,
                        "transfer complete"
                    );
                    DownloadResult::Success {
                        file_path,
                        file_size,
                    }
                }
                Err(TransferError::Cancelled) => {
                    tracing::info!(transfer_id = id.0, "transfer cancelled");
                    DownloadResult::from(TransferError::Cancelled)
                }
                Err(e) => {
                    tracing::error!(transfer_id = id.0, error = %e, "transfer failed");
                    DownloadResult::from(e)
                }
            };

            this.active.lock().await.remove(&id);
            result
        });

        Ok(TransferJob::new(id, handle))
    }

    /// Cancel a running transfer
    ///
    /// Returns `false` if no transfer with this id is running. The transfer
    /// stops at its next chunk boundary and reports a `cancelled` failure.
    pub async fn cancel(&self, id: TransferId) -> bool {
        let active = self.active.lock().await;
        match active.get(&id) {
            Some(transfer) => {
                tracing::debug!(transfer_id = id.0, "cancelling transfer");
                transfer.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every running transfer, returning how many were signalled
    pub async fn cancel_all(&self) -> usize {
        cancel_every(&*self.active.lock().await)
    }

    /// Refuse new transfers and cancel every running one
    ///
    /// Returns how many were signalled. Any later [`start`](Self::start)
    /// fails with [`Error::ShuttingDown`].
    pub async fn close(&self) -> usize {
        let active = self.active.lock().await;
        self.closed.store(true, Ordering::SeqCst);
        cancel_every(&active)
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Snapshot of running transfers, oldest first
    pub async fn active_transfers(&self) -> Vec<TransferInfo> {
        let active = self.active.lock().await;
        let mut transfers: Vec<TransferInfo> =
            active.values().map(|transfer| transfer.info.clone()).collect();
        transfers.sort_by_key(|info| info.id);
        transfers
    }

    /// Number of running transfers
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }

    async fn run(
        &self,
        id: TransferId,
        options: DownloadOptions,
        token: &CancellationToken,
    ) -> std::result::Result<(PathBuf, u64), TransferError> {
        let DownloadOptions {
            url,
            file_name,
            download_path,
            on_begin,
            on_progress,
        } = options;

        let directory = download_path
            .or_else(|| self.default_dir.clone())
            .unwrap_or_else(default_download_dir);

        if !validate_directory(&directory).await {
            return Err(TransferError::DirectoryNotAccessible { path: directory });
        }

        let target = get_unique_path(&directory.join(&file_name), self.max_rename_attempts)?;
        tracing::debug!(transfer_id = id.0, path = %target.display(), "destination chosen");

        let mut response = tokio::select! {
            _ = token.cancelled() => return Err(TransferError::Cancelled),
            response = self.client.get(&url).send() => response?,
        };

        let status = response.status();
        match status {
            reqwest::StatusCode::OK => {}
            reqwest::StatusCode::NOT_FOUND => return Err(TransferError::PackageNotFound),
            reqwest::StatusCode::FORBIDDEN => return Err(TransferError::AccessDenied),
            other => {
                return Err(TransferError::UnexpectedStatus {
                    status: other.as_u16(),
                });
            }
        }

        let part_path = part_path(&target);
        let written = self
            .write_body(id, &mut response, &part_path, token, on_begin, on_progress)
            .await;

        if let Err(e) = written {
            remove_part_file(id, &part_path).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&part_path, &target).await {
            remove_part_file(id, &part_path).await;
            return Err(e.into());
        }

        let metadata = tokio::fs::metadata(&target)
            .await
            .map_err(|_| TransferError::IncompleteWrite {
                path: target.clone(),
            })?;
        if !metadata.is_file() {
            return Err(TransferError::IncompleteWrite { path: target });
        }

        Ok((target, metadata.len()))
    }

    async fn write_body(
        &self,
        id: TransferId,
        response: &mut reqwest::Response,
        part_path: &Path,
        token: &CancellationToken,
        on_begin: Option<BeginCallback>,
        mut on_progress: Option<ProgressCallback>,
    ) -> std::result::Result<(), TransferError> {
        let mut file = tokio::fs::File::create(part_path).await?;
        let mut tracker = ProgressTracker::new(response.content_length().unwrap_or(0));

        if let Some(on_begin) = on_begin {
            on_begin();
        }

        loop {
            let chunk = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(TransferError::Cancelled),
                chunk = response.chunk() => chunk?,
            };
            let Some(chunk) = chunk else {
                break;
            };

            file.write_all(&chunk).await?;
            let progress = tracker.advance(chunk.len() as u64);

            if let Some(transfer) = self.active.lock().await.get_mut(&id) {
                transfer.info.progress = progress;
            }
            if let Some(on_progress) = on_progress.as_mut() {
                on_progress(progress);
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

impl std::fmt::Debug for FileTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTransfer")
            .field("default_dir", &self.default_dir)
            .field("max_rename_attempts", &self.max_rename_attempts)
            .finish_non_exhaustive()
    }
}

fn cancel_every(active: &HashMap<TransferId, ActiveTransfer>) -> usize {
    for (id, transfer) in active {
        tracing::debug!(transfer_id = id.0, "cancelling transfer");
        transfer.token.cancel();
    }
    active.len()
}

/// `{target}.part`
fn part_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

async fn remove_part_file(id: TransferId, path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(transfer_id = id.0, path = %path.display(), "removed partial file")
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            transfer_id = id.0,
            path = %path.display(),
            error = %e,
            "failed to remove partial file"
        ),
    }
}
