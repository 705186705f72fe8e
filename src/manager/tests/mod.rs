use super::*;
use crate::error::Error;
use crate::types::{JobId, JobState};
use std::time::Duration;
use tempfile::TempDir;


/// Create a manager rooted in a fresh tempdir (which must be kept alive)
async fn create_test_manager() -> (ZimManager, TempDir) {
    create_test_manager_with(|_| {}).await
}

async fn create_test_manager_with(customize: impl FnOnce(&mut Config)) -> (ZimManager, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.storage.storage_path = temp_dir.path().join("zim");
    config.transfer.chunk_size_bytes = 64;
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    customize(&mut config);

    let manager = ZimManager::new(config).await.unwrap();
    (manager, temp_dir)
}

async fn wait_for_state(manager: &ZimManager, id: &JobId, state: JobState) {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if manager.download_status(id).await.unwrap().status == state {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job did not reach the expected state in time")
}
