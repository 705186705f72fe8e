use super::*;
use crate::error::Error;
use crate::library::{LibraryRegistrar, NoOpLibraryRegistrar};
use crate::storage::ZimStorage;
use crate::types::{Event, Job, JobId, JobState};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

mod status;

/// Everything a scheduler test needs to observe, plus the tempdir keeping storage alive
struct TestScheduler {
    scheduler: JobScheduler,
    registry: JobRegistry,
    storage: ZimStorage,
    events: broadcast::Receiver<Event>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    _dir: TempDir,
}

fn create_test_scheduler(chunk_size: usize) -> TestScheduler {
    create_test_scheduler_with_library(chunk_size, Arc::new(NoOpLibraryRegistrar))
}

fn create_test_scheduler_with_library(
    chunk_size: usize,
    library: Arc<dyn LibraryRegistrar>,
) -> TestScheduler {
    let dir = tempfile::tempdir().unwrap();
    let storage = ZimStorage::new(dir.path(), "zim");
    let registry = JobRegistry::new();
    let (event_tx, events) = broadcast::channel(1024);
    let tracker = TaskTracker::new();
    let cancel = CancellationToken::new();

    let ctx = TransferContext {
        registry: registry.clone(),
        storage: storage.clone(),
        engine: Arc::new(TransferEngine::with_client(
            reqwest::Client::new(),
            chunk_size,
        )),
        library,
        event_tx,
        tracker: tracker.clone(),
        cancel: cancel.clone(),
    };

    TestScheduler {
        scheduler: JobScheduler::new(ctx, "zim"),
        registry,
        storage,
        events,
        tracker,
        cancel,
        _dir: dir,
    }
}

/// Poll the registry until the job reaches a terminal state
async fn wait_for_terminal(registry: &JobRegistry, id: &JobId) -> Job {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let job = registry.get(id).await.unwrap();
            if job.state.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job did not finish in time")
}

/// Drain every event currently buffered on `rx`
fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
