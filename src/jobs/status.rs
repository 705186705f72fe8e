//! Read-only status view over the job registry.

use super::JobRegistry;
use crate::error::Result;
use crate::types::{Job, JobId, JobStatus};

/// Whole percent of `downloaded` over `total`, capped at 100; 0 when `total` is unknown
pub fn progress_percent(downloaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (downloaded as u128 * 100) / total as u128;
    percent.min(100) as u8
}

impl From<&Job> for JobStatus {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.state,
            progress: progress_percent(job.bytes_downloaded, job.bytes_total),
            downloaded: job.bytes_downloaded,
            total_size: job.bytes_total,
            error: job.error.clone(),
        }
    }
}

/// Answers status polls without ever waiting on a transfer
#[derive(Clone)]
pub struct StatusService {
    registry: JobRegistry,
}

impl StatusService {
    /// Create a view over `registry`
    pub fn new(registry: JobRegistry) -> Self {
        Self { registry }
    }

    /// Current status of `id`, or [`Error::JobNotFound`](crate::Error::JobNotFound)
    pub async fn status(&self, id: &JobId) -> Result<JobStatus> {
        let job = self.registry.get(id).await?;
        Ok(JobStatus::from(&job))
    }

    /// Status of every job, oldest first
    pub async fn all(&self) -> Vec<JobStatus> {
        self.registry.list().await.iter().map(JobStatus::from).collect()
    }
}
