//! Download submission and status queries.

use super::ZimManager;
use crate::error::{Error, Result};
use crate::types::{Job, JobId, JobStatus};
use std::sync::atomic::Ordering;

impl ZimManager {
    /// Start downloading `url` into storage and return the new `Pending` job at once
    ///
    /// # Errors
    ///
    /// - [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) has begun
    /// - [`Error::InvalidUrl`] for unparsable or non-http(s) URLs
    /// - [`Error::FileAlreadyExists`] when the target name is already in storage
    ///
    /// Transfer failures never surface here; poll
    /// [`download_status`](Self::download_status) instead.
    pub async fn submit_download(&self, url: &str) -> Result<Job> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }
        self.scheduler.submit(url).await
    }

    /// Current status of a job
    pub async fn download_status(&self, id: &JobId) -> Result<JobStatus> {
        self.status.status(id).await
    }

    /// Status of every job submitted since startup, oldest first
    pub async fn list_jobs(&self) -> Vec<JobStatus> {
        self.status.all().await
    }

    /// Submit every URL listed in the configuration
    ///
    /// URLs whose file is already present are skipped; other rejections are
    /// logged. Returns the ids of the jobs that were started.
    pub async fn queue_startup_urls(&self) -> Vec<JobId> {
        let mut started = Vec::new();

        for url in &self.config.urls {
            match self.submit_download(url).await {
                Ok(job) => started.push(job.id),
                Err(Error::FileAlreadyExists(filename)) => {
                    tracing::info!(url = %url, filename = %filename, "File already present, skipping");
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Failed to queue startup download");
                }
            }
        }

        if !self.config.urls.is_empty() {
            tracing::info!(
                configured = self.config.urls.len(),
                started = started.len(),
                "Queued startup downloads"
            );
        }
        started
    }
}
