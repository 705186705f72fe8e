//! Storage accessor for the ZIM directory.
//!
//! Thin async wrapper over `tokio::fs` rooted at the configured storage path.
//! Every name passed in is validated with [`is_safe_filename`] so callers can
//! never reach outside the root.

use crate::error::{Error, Result};
use crate::types::ZimFileInfo;
use crate::utils::{format_size, is_safe_filename};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// File presence, metadata, listing and deletion for one storage directory
#[derive(Debug, Clone)]
pub struct ZimStorage {
    root: PathBuf,
    extension: String,
}

impl ZimStorage {
    /// Create an accessor for `root`, listing files ending in `.<extension>`
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// The storage directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage directory (and parents) if missing
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create storage directory '{}': {}",
                    self.root.display(),
                    e
                ),
            ))
        })
    }

    /// Absolute path for `name`, rejecting names that escape the root
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !is_safe_filename(name) {
            return Err(Error::InvalidFilename(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Whether a file named `name` is present
    ///
    /// Invalid names and unreadable entries count as absent.
    pub async fn exists(&self, name: &str) -> bool {
        match self.path_for(name) {
            Ok(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Size in bytes of `name`
    pub async fn size(&self, name: &str) -> Result<u64> {
        let path = self.path_for(name)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(e, name))?;
        Ok(metadata.len())
    }

    /// Metadata record for `name`
    pub async fn info(&self, name: &str) -> Result<ZimFileInfo> {
        let path = self.path_for(name)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(e, name))?;
        if !metadata.is_file() {
            return Err(Error::FileNotFound(name.to_string()));
        }
        Ok(file_info(name.to_string(), &metadata))
    }

    /// All files with the configured extension, newest modification first
    ///
    /// A missing storage directory lists as empty.
    pub async fn list(&self) -> Result<Vec<ZimFileInfo>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !self.matches_extension(&path) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => {
                    files.push(file_info(name.to_string(), &metadata));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Error getting file info");
                }
            }
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(files)
    }

    /// Delete `name`
    pub async fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(e, name))?;
        tracing::info!(filename = name, "Deleted file");
        Ok(())
    }

    /// Create `name` for writing, failing if it already exists
    pub async fn create_new(&self, name: &str) -> Result<tokio::fs::File> {
        let path = self.path_for(name)?;
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    Error::FileAlreadyExists(name.to_string())
                } else {
                    Error::Io(e)
                }
            })
    }

    /// Remove `name` if present, ignoring a missing file
    pub async fn remove_if_exists(&self, name: &str) {
        let Ok(path) = self.path_for(name) else {
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove file");
            }
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

fn not_found_or_io(e: std::io::Error, name: &str) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::FileNotFound(name.to_string())
    } else {
        Error::Io(e)
    }
}

fn file_info(name: String, metadata: &std::fs::Metadata) -> ZimFileInfo {
    let modified: DateTime<Utc> = metadata
        .modified()
        .map(DateTime::from)
        .unwrap_or_else(|_| Utc::now());
    let created: DateTime<Utc> = metadata.created().map(DateTime::from).unwrap_or(modified);

    ZimFileInfo {
        name,
        size: metadata.len(),
        size_formatted: format_size(metadata.len()),
        modified,
        created,
    }
}
