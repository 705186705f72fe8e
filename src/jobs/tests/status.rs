use super::*;

#[test]
fn test_progress_percent() {
    assert_eq!(progress_percent(0, 0), 0);
    assert_eq!(progress_percent(500, 0), 0);
    assert_eq!(progress_percent(0, 1000), 0);
    assert_eq!(progress_percent(333, 1000), 33);
    assert_eq!(progress_percent(999, 1000), 99);
    assert_eq!(progress_percent(1000, 1000), 100);
    // A server that under-declares its length never pushes past 100
    assert_eq!(progress_percent(1500, 1000), 100);
    assert_eq!(progress_percent(u64::MAX, u64::MAX), 100);
}

#[tokio::test]
async fn test_status_reflects_job() {
    let registry = JobRegistry::new();
    let status = StatusService::new(registry.clone());
    let id = JobId::generate();
    registry
        .create(Job::new(id.clone(), "http://example.test/a.zim", "a.zim"))
        .await
        .unwrap();

    let pending = status.status(&id).await.unwrap();
    assert_eq!(pending.status, JobState::Pending);
    assert_eq!(pending.progress, 0);
    assert_eq!(pending.error, None);

    registry
        .update(&id, |job| job.record_progress(250, 1000))
        .await
        .unwrap();
    let downloading = status.status(&id).await.unwrap();
    assert_eq!(downloading.status, JobState::Downloading);
    assert_eq!(downloading.progress, 25);
    assert_eq!(downloading.downloaded, 250);
    assert_eq!(downloading.total_size, 1000);

    registry.update(&id, |job| job.fail("HTTP error 500")).await.unwrap();
    let failed = status.status(&id).await.unwrap();
    assert_eq!(failed.status, JobState::Failed);
    assert_eq!(failed.error.as_deref(), Some("HTTP error 500"));
}

#[tokio::test]
async fn test_status_of_unknown_job() {
    let status = StatusService::new(JobRegistry::new());
    let err = status.status(&JobId::from("nope")).await.unwrap_err();
    assert!(matches!(err, Error::JobNotFound(_)));
}

#[tokio::test]
async fn test_all_lists_every_job() {
    let registry = JobRegistry::new();
    let status = StatusService::new(registry.clone());
    assert!(status.all().await.is_empty());

    for name in ["a.zim", "b.zim", "c.zim"] {
        registry
            .create(Job::new(
                JobId::generate(),
                format!("http://example.test/{}", name),
                name,
            ))
            .await
            .unwrap();
    }

    assert_eq!(status.all().await.len(), 3);
}
