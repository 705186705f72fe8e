//! # kiwix-manager
//!
//! Storage management for the ZIM archives served by kiwix-serve.
//!
//! A [`ZimManager`] owns one storage directory. Files get there by URL
//! download (a background job per URL, with pollable progress) or by
//! streamed upload, and can be listed, inspected and deleted. Completed
//! downloads are optionally registered in a kiwix library via
//! `kiwix-manage`.
//!
//! The same operations are exposed over HTTP by the [`api`] module, together
//! with a small management page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kiwix_manager::{Config, ZimManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = ZimManager::new(Config::default()).await?;
//!
//!     let mut events = manager.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let job = manager
//!         .submit_download("https://download.kiwix.org/zim/wikipedia_en_100.zim")
//!         .await?;
//!     println!("{} -> {:?}", job.target_filename, manager.download_status(&job.id).await?);
//!
//!     manager.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Download jobs: registry, transfer engine, scheduler, status
pub mod jobs;
/// Registration of finished files in a kiwix library
pub mod library;
/// The manager facade tying storage, jobs and the library together
pub mod manager;
/// The storage directory
pub mod storage;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{ApiConfig, Config, LibraryConfig, StorageConfig, TransferConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus, TransferError};
pub use library::{CliLibraryRegistrar, LibraryRegistrar, NoOpLibraryRegistrar};
pub use manager::ZimManager;
pub use storage::ZimStorage;
pub use types::{
    DownloadRequest, DownloadStarted, Event, Job, JobId, JobState, JobStatus, UploadResult,
    ZimFileInfo,
};

use std::sync::Arc;
use std::time::Duration;

/// How long to wait for the API server to drain after shutdown
const SERVER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Serve the API until a termination signal, then shut down gracefully.
///
/// Starts the API server, waits for a signal (or for the server to fail),
/// then calls [`ZimManager::shutdown`] and waits for the server to stop.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use kiwix_manager::{Config, ZimManager, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let manager = Arc::new(ZimManager::new(Config::default()).await?);
///     run_with_shutdown(manager).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(manager: Arc<ZimManager>) -> Result<()> {
    let mut server = manager.spawn_api_server();

    let server_result = tokio::select! {
        _ = wait_for_signal() => None,
        joined = &mut server => Some(joined),
    };

    manager.shutdown().await?;

    let joined = match server_result {
        Some(joined) => joined,
        None => match tokio::time::timeout(SERVER_DRAIN_TIMEOUT, &mut server).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!("API server did not stop in time, aborting it");
                server.abort();
                return Ok(());
            }
        },
    };

    match joined {
        Ok(result) => result,
        Err(e) => Err(Error::ApiServerError(format!("API server task failed: {}", e))),
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received Ctrl+C signal");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
