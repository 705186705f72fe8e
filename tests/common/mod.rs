//! Common test utilities for kiwix-manager integration tests

use kiwix_manager::{Config, Event, JobId, JobStatus, LibraryRegistrar, ZimManager};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;

/// Manager with storage in a fresh tempdir (kept alive by the returned guard)
pub async fn create_manager(library: Arc<dyn LibraryRegistrar>) -> (Arc<ZimManager>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut config = Config::default();
    config.storage.storage_path = temp_dir.path().join("zim");
    config.transfer.chunk_size_bytes = 256;
    config.server.api.bind_address = "127.0.0.1:0".parse().expect("valid address");

    let manager = ZimManager::with_library(config, library)
        .await
        .expect("Failed to create manager");
    (Arc::new(manager), temp_dir)
}

/// Poll until the job is completed or failed
pub async fn wait_until_finished(manager: &ZimManager, id: &JobId) -> JobStatus {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let status = manager.download_status(id).await.expect("job exists");
            if status.status.is_terminal() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("job did not finish within 10s")
}

/// Collect events until `done` matches one, or a timeout
pub async fn collect_events_until(
    events: &mut broadcast::Receiver<Event>,
    done: impl Fn(&Event) -> bool,
) -> Vec<Event> {
    let mut seen = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(10), async {
        while let Ok(event) = events.recv().await {
            let finished = done(&event);
            seen.push(event);
            if finished {
                break;
            }
        }
    })
    .await;
    seen
}
