//! In-memory job registry.

use crate::error::{Error, Result};
use crate::types::{Job, JobId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Map of job id to job record, shared between transfer tasks and pollers
///
/// Cloning is cheap and every clone sees the same map. All writes go through
/// [`update`](Self::update), whose mutator runs under the write lock, so a
/// reader never observes a half-applied change.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new job
    ///
    /// Fails with [`Error::DuplicateJobId`] if the id is already registered.
    pub async fn create(&self, job: Job) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(Error::DuplicateJobId(job.id.to_string()));
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    /// Snapshot of one job
    pub async fn get(&self, id: &JobId) -> Result<Job> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::JobNotFound(id.to_string()))
    }

    /// Apply `mutator` to a job atomically and return its result
    pub async fn update<F, R>(&self, id: &JobId, mutator: F) -> Result<R>
    where
        F: FnOnce(&mut Job) -> R,
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        Ok(mutator(job))
    }

    /// Snapshot of all jobs, oldest first
    pub async fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        jobs
    }

    /// Number of registered jobs
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Whether no job was ever registered
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
