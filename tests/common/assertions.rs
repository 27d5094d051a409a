//! Event-driven waits and file assertions

use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;
use vsix_dl::{Event, TransferId};

/// Terminal outcome of a transfer as seen on the event stream
#[derive(Debug)]
pub enum WaitResult {
    /// Transfer finished; file is at the path
    Completed(std::path::PathBuf, u64),
    /// Transfer failed with this code
    Failed(String),
    /// Transfer was cancelled
    Cancelled,
    /// Timeout waiting for a terminal event
    Timeout,
    /// Channel closed unexpectedly
    ChannelClosed,
}

/// Wait for `id` to reach a terminal event
pub async fn wait_for_transfer(
    events: &mut broadcast::Receiver<Event>,
    id: TransferId,
    timeout: Duration,
) -> WaitResult {
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::TransferComplete {
                    id: event_id,
                    file_path,
                    file_size,
                }) if event_id == id => return WaitResult::Completed(file_path, file_size),
                Ok(Event::TransferFailed {
                    id: event_id, code, ..
                }) if event_id == id => return WaitResult::Failed(code),
                Ok(Event::TransferCancelled { id: event_id }) if event_id == id => {
                    return WaitResult::Cancelled;
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    result.unwrap_or(WaitResult::Timeout)
}

/// Assert that `path` exists with exactly `expected` as its content
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let content = std::fs::read(path)
        .unwrap_or_else(|e| panic!("could not read {}: {}", path.display(), e));
    assert_eq!(content, expected, "unexpected content in {}", path.display());
}

/// Assert that no `.part` files were left behind in `dir`
pub fn assert_no_partial_files(dir: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "part"))
        .collect();
    assert!(leftovers.is_empty(), "partial files left: {:?}", leftovers);
}
