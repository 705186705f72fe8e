//! Download submission: validate, register, launch.

use super::transfer::{ProgressSink, TransferEngine};
use super::JobRegistry;
use crate::error::{Error, Result};
use crate::library::LibraryRegistrar;
use crate::storage::ZimStorage;
use crate::types::{Event, Job, JobId};
use crate::utils::{filename_from_url, is_safe_filename, synthesized_filename};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use url::Url;

/// A validated download request, ready to be registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    /// Normalised source URL
    pub url: Url,
    /// File name the download will be stored under
    pub target_filename: String,
}

/// Parse `raw` and derive the target filename
///
/// The URL must be absolute http(s) with a host. The filename is the last path
/// segment verbatim, or `download_<unix-seconds>.<extension>` when the path has
/// none.
pub fn plan_download(raw: &str, extension: &str) -> Result<DownloadPlan> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            raw,
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(format!("{}: missing host", raw)));
    }

    let target_filename =
        filename_from_url(&url).unwrap_or_else(|| synthesized_filename(extension));
    if !is_safe_filename(&target_filename) {
        return Err(Error::InvalidUrl(format!(
            "{}: path does not name a usable file",
            raw
        )));
    }

    Ok(DownloadPlan {
        url,
        target_filename,
    })
}

/// Shared handles every transfer task needs
#[derive(Clone)]
pub(crate) struct TransferContext {
    pub(crate) registry: JobRegistry,
    pub(crate) storage: ZimStorage,
    pub(crate) engine: Arc<TransferEngine>,
    pub(crate) library: Arc<dyn LibraryRegistrar>,
    pub(crate) event_tx: broadcast::Sender<Event>,
    pub(crate) tracker: TaskTracker,
    pub(crate) cancel: CancellationToken,
}

/// Accepts download requests and runs each one as an independent task
#[derive(Clone)]
pub struct JobScheduler {
    ctx: TransferContext,
    extension: String,
}

impl JobScheduler {
    pub(crate) fn new(ctx: TransferContext, extension: impl Into<String>) -> Self {
        Self {
            ctx,
            extension: extension.into(),
        }
    }

    /// Start downloading `url` and return the freshly registered job at once
    ///
    /// Fails synchronously with [`Error::InvalidUrl`] or
    /// [`Error::FileAlreadyExists`]; in both cases no job is registered and no
    /// task is started. Transfer failures are recorded on the job instead.
    pub async fn submit(&self, url: &str) -> Result<Job> {
        let plan = plan_download(url, &self.extension)?;

        if self.ctx.storage.exists(&plan.target_filename).await {
            return Err(Error::FileAlreadyExists(plan.target_filename));
        }
        let destination = self.ctx.storage.path_for(&plan.target_filename)?;

        let id = JobId::generate();
        let job = Job::new(id.clone(), plan.url.as_str(), &plan.target_filename);
        self.ctx.registry.create(job.clone()).await?;

        tracing::info!(
            job_id = %id,
            url = %plan.url,
            filename = %plan.target_filename,
            "Started download job"
        );
        self.ctx
            .event_tx
            .send(Event::Queued {
                id: id.clone(),
                url: plan.url.to_string(),
                filename: plan.target_filename.clone(),
            })
            .ok();

        let ctx = self.ctx.clone();
        let task_id = id.clone();
        self.ctx.tracker.spawn(async move {
            run_job(ctx, task_id, plan, destination).await;
        });

        Ok(job)
    }
}

/// Progress sink that writes into the registry and re-broadcasts as events
struct RegistryProgress {
    id: JobId,
    registry: JobRegistry,
    event_tx: broadcast::Sender<Event>,
}

#[async_trait]
impl ProgressSink for RegistryProgress {
    async fn on_progress(&self, downloaded: u64, total: u64) {
        let changed = self
            .registry
            .update(&self.id, |job| job.record_progress(downloaded, total))
            .await
            .unwrap_or(false);

        if changed {
            tracing::debug!(job_id = %self.id, downloaded, total, "Download progress");
            self.event_tx
                .send(Event::Progress {
                    id: self.id.clone(),
                    downloaded,
                    total,
                })
                .ok();
        }
    }
}

/// Body of one transfer task; owns the job until it reaches a terminal state
async fn run_job(ctx: TransferContext, id: JobId, plan: DownloadPlan, destination: PathBuf) {
    let sink = RegistryProgress {
        id: id.clone(),
        registry: ctx.registry.clone(),
        event_tx: ctx.event_tx.clone(),
    };

    tracing::info!(job_id = %id, url = %plan.url, path = %destination.display(), "Starting download");
    let outcome = ctx
        .engine
        .run(plan.url.as_str(), &destination, &sink, &ctx.cancel)
        .await;

    match outcome {
        Ok(size) => {
            if let Err(e) = ctx.registry.update(&id, |job| job.complete(size)).await {
                tracing::error!(job_id = %id, error = %e, "Failed to record completion");
            }
            tracing::info!(
                job_id = %id,
                filename = %plan.target_filename,
                size = %crate::utils::format_size(size),
                "Download completed"
            );
            ctx.event_tx
                .send(Event::Completed {
                    id: id.clone(),
                    filename: plan.target_filename.clone(),
                    size,
                })
                .ok();

            match ctx.library.register(&destination, plan.url.as_str()).await {
                Ok(outcome) => {
                    tracing::debug!(job_id = %id, ?outcome, registrar = ctx.library.name(), "Library registration finished");
                }
                Err(e) => {
                    tracing::warn!(job_id = %id, error = %e, "Failed to register file in library");
                }
            }
        }
        Err(e) => {
            let message = e.to_string();
            if let Err(update_err) = ctx.registry.update(&id, |job| job.fail(&message)).await {
                tracing::error!(job_id = %id, error = %update_err, "Failed to record failure");
            }
            tracing::error!(job_id = %id, url = %plan.url, error = %message, "Download failed");
            ctx.event_tx
                .send(Event::Failed {
                    id: id.clone(),
                    error: message,
                })
                .ok();
        }
    }
}
