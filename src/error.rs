//! Error types for kiwix-manager
//!
//! This module provides error handling for the library, including:
//! - The top-level [`Error`] returned by synchronous operations
//! - [`TransferError`], recorded on a job when a background transfer fails
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for kiwix-manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kiwix-manager
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "storage_path")
        key: Option<String>,
    },

    /// The download URL could not be parsed or lacks a scheme/host
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A file with the target name is already present in storage
    #[error("file {0} already exists")]
    FileAlreadyExists(String),

    /// Filename rejected (path separators, traversal, empty)
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    /// File not present in storage
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// No job with this id was ever submitted
    #[error("download job {0} not found")]
    JobNotFound(String),

    /// A freshly generated job id collided with an existing one
    #[error("duplicate job id {0}")]
    DuplicateJobId(String),

    /// Upload exceeded the configured size limit
    #[error("file size exceeds maximum allowed size ({limit})")]
    UploadTooLarge {
        /// The configured limit, human readable
        limit: String,
    },

    /// Upload request was malformed (missing file, wrong extension, empty body)
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// External tool execution failed (kiwix-manage)
    #[error("external tool error: {0}")]
    ExternalTool(String),
}

/// Errors raised by the transfer engine while streaming a URL to disk.
///
/// These never cross the task boundary as `Err`; the scheduler records their
/// message on the job and marks it failed.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The server answered with a non-success status
    #[error("HTTP error {status}")]
    Remote {
        /// The status code returned by the server
        status: u16,
    },

    /// Local disk failure while writing the destination
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network failure before or during the body stream
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The transfer finished but produced zero bytes
    #[error("downloaded file is empty")]
    EmptyFile,

    /// The transfer was interrupted by shutdown
    #[error("transfer cancelled")]
    Cancelled,
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "job_not_found",
///     "message": "download job download_1700000000000_1 not found",
///     "details": { "job_id": "download_1700000000000_1" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "file_not_found", "invalid_url")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - rejected input, including name collisions
            Error::Config { .. } => 400,
            Error::InvalidUrl(_) => 400,
            Error::FileAlreadyExists(_) => 400,
            Error::InvalidFilename(_) => 400,
            Error::InvalidUpload(_) => 400,

            // 404 Not Found
            Error::FileNotFound(_) => 404,
            Error::JobNotFound(_) => 404,

            // 413 Payload Too Large
            Error::UploadTooLarge { .. } => 413,

            // 500 Internal Server Error
            Error::DuplicateJobId(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // 502 Bad Gateway - upstream failures
            Error::Network(_) => 502,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
            Error::ExternalTool(_) => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidUrl(_) => "invalid_url",
            Error::FileAlreadyExists(_) => "file_already_exists",
            Error::InvalidFilename(_) => "invalid_filename",
            Error::FileNotFound(_) => "file_not_found",
            Error::JobNotFound(_) => "job_not_found",
            Error::DuplicateJobId(_) => "duplicate_job_id",
            Error::UploadTooLarge { .. } => "upload_too_large",
            Error::InvalidUpload(_) => "invalid_upload",
            Error::ShuttingDown => "shutting_down",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ExternalTool(_) => "external_tool_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::JobNotFound(id) => Some(serde_json::json!({ "job_id": id })),
            Error::FileAlreadyExists(name) | Error::FileNotFound(name) => {
                Some(serde_json::json!({ "filename": name }))
            }
            Error::UploadTooLarge { limit } => Some(serde_json::json!({ "limit": limit })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
