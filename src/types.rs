//! Core types for kiwix-manager

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use utoipa::ToSchema;

/// Process-wide counter that makes job ids unique within one millisecond
static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a download job
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a fresh id of the form `download_<unix-millis>_<sequence>`
    ///
    /// The sequence is shared by the whole process, so two ids generated in the
    /// same millisecond still differ.
    pub fn generate() -> Self {
        let seq = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed) + 1;
        Self(format!(
            "download_{}_{}",
            Utc::now().timestamp_millis(),
            seq
        ))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Download job state
///
/// Transitions only move forward: `Pending -> Downloading -> Completed | Failed`,
/// with `Pending -> Failed` for failures before the first progress report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Registered, transfer not yet producing progress
    Pending,
    /// Response headers received, body streaming to disk
    Downloading,
    /// File fully written and non-empty
    Completed,
    /// Transfer failed; see the job's error
    Failed,
}

impl JobState {
    /// Whether no further transitions can occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Whether moving from `self` to `next` respects the state machine
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Pending, JobState::Downloading)
                | (JobState::Pending, JobState::Failed)
                | (JobState::Downloading, JobState::Completed)
                | (JobState::Downloading, JobState::Failed)
        )
    }
}

/// One tracked attempt to download a remote file into storage
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Job identifier
    pub id: JobId,
    /// Source URL
    pub url: String,
    /// Name of the file created in storage
    pub target_filename: String,
    /// Current state
    pub state: JobState,
    /// Bytes written so far
    pub bytes_downloaded: u64,
    /// Declared content length, 0 when unknown
    pub bytes_total: u64,
    /// Failure reason, only set when `state` is `Failed`
    pub error: Option<String>,
    /// When the job was registered
    pub created_at: DateTime<Utc>,
    /// When the job reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a job in the `Pending` state
    pub fn new(id: JobId, url: impl Into<String>, target_filename: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            target_filename: target_filename.into(),
            state: JobState::Pending,
            bytes_downloaded: 0,
            bytes_total: 0,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Apply a progress report from the transfer
    ///
    /// The first report moves the job to `Downloading`. Counters never move
    /// backwards and reports arriving after a terminal state are ignored.
    /// Returns whether the job changed.
    pub fn record_progress(&mut self, downloaded: u64, total: u64) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        if self.state == JobState::Pending {
            self.state = JobState::Downloading;
        }
        self.bytes_downloaded = self.bytes_downloaded.max(downloaded);
        self.bytes_total = self.bytes_total.max(total);
        true
    }

    /// Mark the job completed with the final size on disk
    ///
    /// Returns false if the job was not downloading.
    pub fn complete(&mut self, final_size: u64) -> bool {
        if !self.state.can_transition_to(JobState::Completed) {
            return false;
        }
        self.state = JobState::Completed;
        self.bytes_downloaded = self.bytes_downloaded.max(final_size);
        if self.bytes_total == 0 {
            self.bytes_total = self.bytes_downloaded;
        }
        self.finished_at = Some(Utc::now());
        true
    }

    /// Mark the job failed
    ///
    /// Returns false if the job had already finished.
    pub fn fail(&mut self, error: impl Into<String>) -> bool {
        if !self.state.can_transition_to(JobState::Failed) {
            return false;
        }
        self.state = JobState::Failed;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
        true
    }
}

/// Status view returned to pollers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobStatus {
    /// Job identifier
    pub job_id: JobId,
    /// Current state
    pub status: JobState,
    /// Whole percent complete, 0 when the total size is unknown
    pub progress: u8,
    /// Bytes written so far
    pub downloaded: u64,
    /// Declared total size, 0 when unknown
    pub total_size: u64,
    /// Failure reason
    pub error: Option<String>,
}

/// Metadata for one file in storage
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ZimFileInfo {
    /// File name (no directory)
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Human-readable size, e.g. "1.50 GB"
    pub size_formatted: String,
    /// Last modification time
    pub modified: DateTime<Utc>,
    /// Creation time, falling back to modification time where unsupported
    pub created: DateTime<Utc>,
}

/// Request body for POST /api/zim/download
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// URL of the ZIM file to fetch
    #[serde(default)]
    pub url: Option<String>,
}

/// Response for a started download
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadStarted {
    /// Id to poll with GET /api/download/{job_id}/status
    pub job_id: JobId,
    /// File name the download will be stored under
    pub filename: String,
    /// Always "started"
    pub status: String,
}

/// Response for a finished upload
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResult {
    /// Stored file name
    pub filename: String,
    /// Size in bytes
    pub size: u64,
    /// Human-readable size
    pub size_formatted: String,
}

/// Events emitted by the manager
///
/// Consumers subscribe via [`ZimManager::subscribe`](crate::ZimManager::subscribe)
/// or the `/api/events` server-sent event stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A download job was registered
    Queued {
        /// Job identifier
        id: JobId,
        /// Source URL
        url: String,
        /// Target file name
        filename: String,
    },
    /// A transfer reported progress
    Progress {
        /// Job identifier
        id: JobId,
        /// Bytes written so far
        downloaded: u64,
        /// Declared total, 0 when unknown
        total: u64,
    },
    /// A download finished successfully
    Completed {
        /// Job identifier
        id: JobId,
        /// Stored file name
        filename: String,
        /// Final size in bytes
        size: u64,
    },
    /// A download failed
    Failed {
        /// Job identifier
        id: JobId,
        /// Failure reason
        error: String,
    },
    /// The manager is shutting down
    Shutdown,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: std::collections::HashSet<JobId> = (0..1000).map(|_| JobId::generate()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.as_str().starts_with("download_")));
    }

    #[test]
    fn test_state_machine_only_moves_forward() {
        use JobState::*;

        assert!(Pending.can_transition_to(Downloading));
        assert!(Pending.can_transition_to(Failed));
        assert!(Downloading.can_transition_to(Completed));
        assert!(Downloading.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Downloading.can_transition_to(Pending));
        for terminal in [Completed, Failed] {
            for next in [Pending, Downloading, Completed, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_first_progress_starts_downloading() {
        let mut job = Job::new(JobId::from("j"), "http://h/a.zim", "a.zim");
        assert_eq!(job.state, JobState::Pending);

        assert!(job.record_progress(0, 1000));
        assert_eq!(job.state, JobState::Downloading);
        assert_eq!(job.bytes_total, 1000);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut job = Job::new(JobId::from("j"), "http://h/a.zim", "a.zim");
        job.record_progress(500, 1000);
        job.record_progress(200, 1000);
        assert_eq!(job.bytes_downloaded, 500);
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut job = Job::new(JobId::from("j"), "http://h/a.zim", "a.zim");
        job.record_progress(10, 10);
        assert!(job.complete(10));

        assert!(!job.fail("late failure"));
        assert!(!job.record_progress(20, 20));
        assert_eq!(job.state, JobState::Completed);
        assert!(job.error.is_none());
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn test_complete_requires_downloading() {
        let mut job = Job::new(JobId::from("j"), "http://h/a.zim", "a.zim");
        assert!(!job.complete(10));
        assert_eq!(job.state, JobState::Pending);
    }

    #[test]
    fn test_complete_fills_unknown_total() {
        let mut job = Job::new(JobId::from("j"), "http://h/a.zim", "a.zim");
        job.record_progress(0, 0);
        job.record_progress(4096, 0);
        assert!(job.complete(4096));
        assert_eq!(job.bytes_total, 4096);
    }

    #[test]
    fn test_pending_job_can_fail_directly() {
        let mut job = Job::new(JobId::from("j"), "http://h/a.zim", "a.zim");
        assert!(job.fail("HTTP error 404"));
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.error.as_deref(), Some("HTTP error 404"));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = Event::Failed {
            id: JobId::from("download_1_1"),
            error: "HTTP error 503".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "failed");
        assert_eq!(json["id"], "download_1_1");
    }
}
