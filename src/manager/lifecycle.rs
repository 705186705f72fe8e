//! Shutdown coordination and API server spawning.

use super::ZimManager;
use crate::error::Result;
use crate::types::Event;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// How long shutdown waits for in-flight transfer tasks
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl ZimManager {
    /// Gracefully shut down the manager
    ///
    /// 1. Stops accepting new downloads
    /// 2. Cancels every in-flight transfer (each job ends `Failed`, partial
    ///    files are removed)
    /// 3. Waits up to 30 seconds for the transfer tasks to finish
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// The API server started by [`spawn_api_server`](Self::spawn_api_server)
    /// stops accepting connections at step 2.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new downloads");

        let active = self
            .registry
            .list()
            .await
            .iter()
            .filter(|job| !job.state.is_terminal())
            .count();
        tracing::debug!(active, "Cancelling in-flight transfers");
        self.cancel.cancel();

        self.tracker.close();
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.tracker.wait()).await {
            Ok(()) => {
                tracing::info!("All transfer tasks finished");
            }
            Err(_) => {
                tracing::warn!(
                    remaining = self.tracker.len(),
                    "Timeout waiting for transfer tasks, proceeding with shutdown"
                );
            }
        }

        self.emit_event(Event::Shutdown);
        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Whether new downloads are still accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }

    /// Resolves once [`shutdown`](Self::shutdown) has cancelled transfers
    pub async fn shutdown_requested(&self) {
        self.cancel.cancelled().await
    }

    /// Spawn the API server in a background task
    ///
    /// The server shuts down gracefully when [`shutdown`](Self::shutdown) runs.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use kiwix_manager::{Config, ZimManager};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let manager = Arc::new(ZimManager::new(Config::default()).await?);
    /// let api_handle = manager.spawn_api_server();
    ///
    /// // ... later
    /// manager.shutdown().await?;
    /// api_handle.await??;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let manager = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(manager, config).await })
    }
}
