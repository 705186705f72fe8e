//! Configuration types for kiwix-manager

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf};
use utoipa::ToSchema;

/// Storage settings: where ZIM files live and what may be written there
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Directory holding the ZIM files (default: "./zim")
    #[serde(default = "default_storage_path")]
    #[schema(value_type = String)]
    pub storage_path: PathBuf,

    /// Maximum accepted upload size in bytes (default: 10000 MiB)
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_bytes: u64,

    /// Extension (without the dot) of files listed by the storage accessor
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_bytes: default_max_upload_size(),
            extension: default_extension(),
        }
    }
}

/// HTTP transfer settings for URL downloads
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferConfig {
    /// Bytes written per chunk; progress is reported once per chunk (default: 1 MiB, at most 64 MiB)
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: usize,

    /// TCP connect timeout in seconds (default: 30)
    ///
    /// There is deliberately no overall request timeout: ZIM files can take hours.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with download requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// kiwix-serve library registration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LibraryConfig {
    /// Path to the kiwix library XML; registration is disabled when unset
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub library_path: Option<PathBuf>,

    /// Path to the kiwix-manage executable (auto-detected if None)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub kiwix_manage_path: Option<PathBuf>,

    /// Whether to search PATH for kiwix-manage if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            kiwix_manage_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for [`ZimManager`](crate::ZimManager)
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// ZIM storage directory and upload limits
    #[serde(default)]
    pub storage: StorageConfig,

    /// Download transfer tuning
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Library registration after completed downloads
    #[serde(default)]
    pub library: LibraryConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,

    /// URLs to download at startup; files already present are skipped
    #[serde(default)]
    pub urls: Vec<String>,
}

impl Config {
    /// Storage directory
    pub fn storage_path(&self) -> &PathBuf {
        &self.storage.storage_path
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults, so `{}` is a valid file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file '{}': {}", path.display(), e),
            key: None,
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse config file '{}': {}", path.display(), e),
            key: None,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the manager cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.transfer.chunk_size_bytes == 0 {
            return Err(Error::Config {
                message: "chunk size must be greater than zero".into(),
                key: Some("transfer.chunk_size_bytes".into()),
            });
        }
        if self.transfer.chunk_size_bytes > MAX_CHUNK_SIZE {
            return Err(Error::Config {
                message: format!(
                    "chunk size must be at most {} bytes, got {}",
                    MAX_CHUNK_SIZE, self.transfer.chunk_size_bytes
                ),
                key: Some("transfer.chunk_size_bytes".into()),
            });
        }
        if self.storage.max_upload_size_bytes == 0 {
            return Err(Error::Config {
                message: "maximum upload size must be greater than zero".into(),
                key: Some("storage.max_upload_size_bytes".into()),
            });
        }
        if self.storage.extension.is_empty() || self.storage.extension.contains('.') {
            return Err(Error::Config {
                message: format!(
                    "extension must be non-empty and given without a dot, got '{}'",
                    self.storage.extension
                ),
                key: Some("storage.extension".into()),
            });
        }
        Ok(())
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:8112)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication of `/api` routes
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("zim")
}

fn default_max_upload_size() -> u64 {
    10_000 * 1024 * 1024
}

fn default_extension() -> String {
    "zim".to_string()
}

/// Largest accepted `transfer.chunk_size_bytes`; each job buffers one chunk
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

fn default_chunk_size() -> usize {
    1024 * 1024
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("kiwix-manager/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8112))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
