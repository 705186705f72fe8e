//! Download jobs
//!
//! A job is one URL being fetched into the storage directory. The pieces are
//! split so each can be tested on its own:
//! - [`JobRegistry`] - shared map of job records
//! - [`TransferEngine`] - streams one HTTP body to one file and reports progress
//! - [`JobScheduler`] - validates requests and runs each transfer as its own task
//! - [`StatusService`] - read-only snapshots for pollers

mod registry;
mod scheduler;
mod status;
mod transfer;

pub use registry::JobRegistry;
pub use scheduler::{DownloadPlan, JobScheduler, plan_download};
pub(crate) use scheduler::TransferContext;
pub use status::{StatusService, progress_percent};
pub use transfer::{ProgressSink, TransferEngine};

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
