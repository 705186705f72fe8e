//! Top-level manager tying storage, jobs and library registration together
//! (decomposed into focused submodules)

mod downloads;
mod files;
mod lifecycle;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::Result;
use crate::jobs::{JobRegistry, JobScheduler, StatusService, TransferContext, TransferEngine};
use crate::library::{LibraryRegistrar, registrar_from_config};
use crate::storage::ZimStorage;
use crate::types::Event;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Main manager instance (cloneable - all fields are shared handles)
#[derive(Clone)]
pub struct ZimManager {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// The ZIM storage directory
    pub(crate) storage: ZimStorage,
    /// Job records shared with transfer tasks
    pub(crate) registry: JobRegistry,
    /// Accepts download submissions
    pub(crate) scheduler: JobScheduler,
    /// Read-only job status view
    pub(crate) status: StatusService,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Tracks every spawned transfer task
    pub(crate) tracker: TaskTracker,
    /// Cancelled once, at shutdown
    pub(crate) cancel: CancellationToken,
    /// Flag to indicate whether new downloads are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl ZimManager {
    /// Create a manager for `config`
    ///
    /// Creates the storage directory if missing, builds the HTTP client and
    /// picks the library registrar. No jobs are started.
    pub async fn new(config: Config) -> Result<Self> {
        let library = registrar_from_config(&config.library);
        tracing::info!(registrar = library.name(), "Library registrar initialized");
        Self::with_library(config, library).await
    }

    /// Create a manager with an explicit library registrar
    pub async fn with_library(config: Config, library: Arc<dyn LibraryRegistrar>) -> Result<Self> {
        config.validate()?;

        let storage = ZimStorage::new(
            config.storage.storage_path.clone(),
            config.storage.extension.clone(),
        );
        storage.ensure_root().await?;

        let engine = Arc::new(TransferEngine::new(&config.transfer)?);

        // Buffer of 1000 events; slow subscribers see RecvError::Lagged
        let (event_tx, _rx) = broadcast::channel(1000);

        let registry = JobRegistry::new();
        let tracker = TaskTracker::new();
        let cancel = CancellationToken::new();

        let scheduler = JobScheduler::new(
            TransferContext {
                registry: registry.clone(),
                storage: storage.clone(),
                engine,
                library,
                event_tx: event_tx.clone(),
                tracker: tracker.clone(),
                cancel: cancel.clone(),
            },
            config.storage.extension.clone(),
        );

        tracing::info!(
            storage = %storage.root().display(),
            "ZIM manager initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            status: StatusService::new(registry.clone()),
            storage,
            registry,
            scheduler,
            event_tx,
            tracker,
            cancel,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Subscribe to job events
    ///
    /// Each subscriber receives every event independently. A subscriber that
    /// falls more than 1000 events behind gets `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use kiwix_manager::{Config, ZimManager};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let manager = ZimManager::new(Config::default()).await?;
    ///
    ///     let mut events = manager.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "job event");
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// The storage accessor
    pub fn storage(&self) -> &ZimStorage {
        &self.storage
    }

    /// Emit an event to all subscribers, dropping it if nobody listens
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
