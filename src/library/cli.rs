//! Library registration through the external `kiwix-manage` binary

use super::traits::{LibraryRegistrar, RegisterOutcome};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::Mutex;

/// Registers files by running `kiwix-manage <library> add <file> --url <url>`
///
/// Registrations through one instance run one at a time: the library XML is
/// read, checked and rewritten by `kiwix-manage` as a single step.
pub struct CliLibraryRegistrar {
    binary_path: PathBuf,
    library_path: PathBuf,
    lock: Mutex<()>,
}

impl CliLibraryRegistrar {
    /// Create a registrar with an explicit binary and library path
    pub fn new(binary_path: PathBuf, library_path: PathBuf) -> Self {
        Self {
            binary_path,
            library_path,
            lock: Mutex::new(()),
        }
    }

    /// Attempt to find kiwix-manage in PATH
    ///
    /// Returns `None` if the binary is not installed.
    pub fn from_path(library_path: PathBuf) -> Option<Self> {
        which::which("kiwix-manage")
            .ok()
            .map(|binary| Self::new(binary, library_path))
    }

    /// Whether the library XML already mentions the file's basename
    async fn is_registered(&self, zim_file: &Path) -> crate::Result<bool> {
        let Some(basename) = zim_file.file_name().and_then(|n| n.to_str()) else {
            return Ok(false);
        };

        match tokio::fs::read_to_string(&self.library_path).await {
            Ok(content) => Ok(content.contains(basename)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(crate::Error::Io(e)),
        }
    }
}

#[async_trait]
impl LibraryRegistrar for CliLibraryRegistrar {
    async fn register(&self, zim_file: &Path, source_url: &str) -> crate::Result<RegisterOutcome> {
        let _guard = self.lock.lock().await;

        if self.is_registered(zim_file).await? {
            tracing::info!(file = %zim_file.display(), "File is already in the library");
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        let output = Command::new(&self.binary_path)
            .arg(&self.library_path)
            .arg("add")
            .arg(zim_file)
            .arg("--url")
            .arg(source_url)
            .output()
            .await
            .map_err(|e| {
                crate::Error::ExternalTool(format!("Failed to execute kiwix-manage: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(crate::Error::ExternalTool(format!(
                "kiwix-manage exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::info!(
            file = %zim_file.display(),
            library = %self.library_path.display(),
            "Added file to the library"
        );
        Ok(RegisterOutcome::Added)
    }

    fn name(&self) -> &'static str {
        "cli-kiwix-manage"
    }
}
