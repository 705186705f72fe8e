//! Application state for the API server

use crate::{Config, ZimManager};
use std::sync::Arc;

/// Shared state handed to every route handler (cheap Arc clones)
#[derive(Clone)]
pub struct AppState {
    /// The manager doing the actual work
    pub manager: Arc<ZimManager>,

    /// Configuration, read-only
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(manager: Arc<ZimManager>, config: Arc<Config>) -> Self {
        Self { manager, config }
    }
}
