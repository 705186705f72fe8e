//! Traits and types for kiwix library registration

use async_trait::async_trait;
use std::path::Path;

/// What a registration attempt did
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The file was added to the library
    Added,
    /// The library already lists the file
    AlreadyRegistered,
    /// Registration is not configured
    Skipped,
}

/// Trait for adding downloaded ZIM files to the kiwix-serve library
///
/// Implementations either drive an external tool or do nothing. Callers treat
/// failures as operational warnings: a download that completed stays
/// completed even if registration fails.
///
/// # Examples
///
/// ```no_run
/// use kiwix_manager::library::{CliLibraryRegistrar, LibraryRegistrar};
/// use std::path::{Path, PathBuf};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registrar = CliLibraryRegistrar::new(
///     PathBuf::from("/usr/bin/kiwix-manage"),
///     PathBuf::from("/data/library.xml"),
/// );
/// registrar
///     .register(Path::new("/share/zim/wikipedia.zim"), "https://download.kiwix.org/zim/wikipedia.zim")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait LibraryRegistrar: Send + Sync {
    /// Register `zim_file`, downloaded from `source_url`, in the library
    ///
    /// # Errors
    ///
    /// Returns an error if the library cannot be read or the external tool
    /// fails to run or exits unsuccessfully.
    async fn register(&self, zim_file: &Path, source_url: &str) -> crate::Result<RegisterOutcome>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
