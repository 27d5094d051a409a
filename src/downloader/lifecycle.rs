//! Shutdown coordination.

use crate::error::Result;
use crate::types::Event;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::VsixDownloader;

/// How long shutdown waits for cancelled transfers to wind down
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl VsixDownloader {
    /// Gracefully shut down the downloader
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new transfers
    /// 2. Cancels all running transfers (their partial files are removed)
    /// 3. Waits for them to finish with a timeout (30 seconds)
    /// 4. Emits [`Event::Shutdown`]
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new transfers");

        let cancelled = self.transfer.close().await;
        tracing::info!(cancelled, "Signaled cancellation to all running transfers");

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.wait_for_active_transfers()).await {
            Ok(()) => tracing::info!("All running transfers stopped"),
            Err(_) => tracing::warn!(
                "Timeout waiting for transfers to stop, proceeding with shutdown"
            ),
        }

        self.emit_event(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Whether new transfers are still accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }

    async fn wait_for_active_transfers(&self) {
        loop {
            let active_count = self.transfer.active_count().await;
            if active_count == 0 {
                return;
            }

            tracing::debug!(active_count, "Waiting for running transfers to stop");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
