//! Streamed HTTP(S) transfer of one URL to one destination file.

use crate::config::TransferConfig;
use crate::error::{Error, Result, TransferError};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// Receiver of transfer progress
///
/// Called once when the response headers arrive (`downloaded == 0`) and then
/// after every chunk written. `total` is the declared content length, or 0
/// for the whole transfer when the server did not send one.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Report bytes written so far and the expected total
    async fn on_progress(&self, downloaded: u64, total: u64);
}

/// Streams response bodies to disk in fixed-size chunks
///
/// The engine knows nothing about jobs: it reports through a [`ProgressSink`]
/// and returns the final size or a [`TransferError`]. On any error the
/// destination file is removed before returning.
pub struct TransferEngine {
    client: reqwest::Client,
    chunk_size: usize,
}

impl TransferEngine {
    /// Build an engine with its own HTTP client
    ///
    /// Redirects are followed with reqwest's default policy. Only the connect
    /// phase has a timeout.
    pub fn new(config: &TransferConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(Error::Network)?;

        Ok(Self::with_client(client, config.chunk_size_bytes))
    }

    /// Build an engine around an existing client
    pub fn with_client(client: reqwest::Client, chunk_size: usize) -> Self {
        Self {
            client,
            chunk_size: chunk_size.clamp(1, crate::config::MAX_CHUNK_SIZE),
        }
    }

    /// Download `url` to `destination`
    ///
    /// Returns the number of bytes on disk. A zero-byte result is an
    /// [`TransferError::EmptyFile`]. Cancelling `cancel` aborts the transfer
    /// with [`TransferError::Cancelled`].
    pub async fn run(
        &self,
        url: &str,
        destination: &Path,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> std::result::Result<u64, TransferError> {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransferError::Cancelled),
            response = self.client.get(url).send() => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Remote {
                status: status.as_u16(),
            });
        }

        let total = response.content_length().unwrap_or(0);
        tracing::debug!(url, total, "Response headers received");
        sink.on_progress(0, total).await;

        let result = match tokio::fs::File::create(destination).await {
            Ok(file) => self.stream_body(response, file, total, sink, cancel).await,
            Err(e) => Err(TransferError::Io(e)),
        };

        let outcome = match result {
            Ok(_) => match tokio::fs::metadata(destination).await {
                Ok(metadata) if metadata.len() == 0 => Err(TransferError::EmptyFile),
                Ok(metadata) => Ok(metadata.len()),
                Err(e) => Err(TransferError::Io(e)),
            },
            Err(e) => Err(e),
        };

        if outcome.is_err() {
            discard_partial(destination).await;
        }
        outcome
    }

    async fn stream_body(
        &self,
        response: reqwest::Response,
        mut file: tokio::fs::File,
        total: u64,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> std::result::Result<u64, TransferError> {
        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::with_capacity(self.chunk_size);
        let mut written: u64 = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransferError::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;

            let mut data: &[u8] = &chunk;
            while !data.is_empty() {
                let take = (self.chunk_size - buffer.len()).min(data.len());
                buffer.extend_from_slice(&data[..take]);
                data = &data[take..];

                if buffer.len() == self.chunk_size {
                    file.write_all(&buffer).await?;
                    written += buffer.len() as u64;
                    buffer.clear();
                    sink.on_progress(written, total).await;
                }
            }
        }

        if !buffer.is_empty() {
            file.write_all(&buffer).await?;
            written += buffer.len() as u64;
            sink.on_progress(written, total).await;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

/// Remove a partially written destination so a retry finds the name free
async fn discard_partial(destination: &Path) {
    match tokio::fs::remove_file(destination).await {
        Ok(()) => {
            tracing::debug!(path = %destination.display(), "Removed partial download");
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                path = %destination.display(),
                error = %e,
                "Failed to remove partial download"
            );
        }
    }
}
