//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`zim`] - Stored files: list, info, delete, upload
//! - [`downloads`] - URL downloads and job status
//! - [`system`] - UI page, health, OpenAPI, events

use serde::{Deserialize, Serialize};

mod downloads;
mod system;
mod zim;

// Re-export all handlers so `routes::function_name` works from the router
pub use downloads::*;
pub use system::*;
pub use zim::*;

/// Response for DELETE /api/zim/:filename
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    /// Confirmation message
    pub message: String,
}

/// Response for GET /api/health
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the server answers
    pub status: String,
    /// Crate version
    pub version: String,
    /// Whether new downloads are accepted
    pub accepting_downloads: bool,
}
