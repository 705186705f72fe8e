//! Operations on files already in storage: listing, metadata, deletion, upload.

use super::ZimManager;
use crate::error::{Error, Result};
use crate::types::{UploadResult, ZimFileInfo};
use crate::utils::format_size;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use tokio::io::AsyncWriteExt;

impl ZimManager {
    /// Files in storage with the configured extension, newest first
    pub async fn list_files(&self) -> Result<Vec<ZimFileInfo>> {
        self.storage.list().await
    }

    /// Metadata for one stored file
    pub async fn file_info(&self, filename: &str) -> Result<ZimFileInfo> {
        self.storage.info(filename).await
    }

    /// Delete a stored file
    pub async fn delete_file(&self, filename: &str) -> Result<()> {
        self.storage.delete(filename).await
    }

    /// Store an uploaded file streamed as chunks
    ///
    /// The name must carry the storage extension and must not exist yet. The
    /// body is written as it arrives; once it passes
    /// `storage.max_upload_size_bytes` the partial file is removed and
    /// [`Error::UploadTooLarge`] returned. An empty body is removed too.
    pub async fn upload<S, B, E>(&self, filename: &str, body: S) -> Result<UploadResult>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        let extension = &self.config.storage.extension;
        let suffix = format!(".{}", extension);
        if !filename.ends_with(&suffix) || filename.len() == suffix.len() {
            return Err(Error::InvalidUpload(format!(
                "only {} files are allowed",
                suffix
            )));
        }

        let file = self.storage.create_new(filename).await?;
        match self.write_upload(file, body).await {
            Ok(0) => {
                self.storage.remove_if_exists(filename).await;
                Err(Error::InvalidUpload("uploaded file is empty".to_string()))
            }
            Ok(size) => {
                tracing::info!(filename, size = %format_size(size), "Stored uploaded file");
                Ok(UploadResult {
                    filename: filename.to_string(),
                    size,
                    size_formatted: format_size(size),
                })
            }
            Err(e) => {
                tracing::warn!(filename, error = %e, "Upload failed, removing partial file");
                self.storage.remove_if_exists(filename).await;
                Err(e)
            }
        }
    }

    async fn write_upload<S, B, E>(&self, mut file: tokio::fs::File, body: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        let limit = self.config.storage.max_upload_size_bytes;
        let mut body = std::pin::pin!(body);
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| Error::InvalidUpload(e.to_string()))?;
            let data = chunk.as_ref();

            written += data.len() as u64;
            if written > limit {
                return Err(Error::UploadTooLarge {
                    limit: format_size(limit),
                });
            }
            file.write_all(data).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}
