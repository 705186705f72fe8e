//! Registrar used when no library is configured

use super::traits::{LibraryRegistrar, RegisterOutcome};
use async_trait::async_trait;
use std::path::Path;

/// Registrar that leaves the library untouched
///
/// # Examples
///
/// ```
/// use kiwix_manager::library::{LibraryRegistrar, NoOpLibraryRegistrar, RegisterOutcome};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = NoOpLibraryRegistrar
///     .register(Path::new("wiki.zim"), "http://example.test/wiki.zim")
///     .await?;
/// assert_eq!(outcome, RegisterOutcome::Skipped);
/// # Ok(())
/// # }
/// ```
pub struct NoOpLibraryRegistrar;

#[async_trait]
impl LibraryRegistrar for NoOpLibraryRegistrar {
    async fn register(&self, _zim_file: &Path, _source_url: &str) -> crate::Result<RegisterOutcome> {
        Ok(RegisterOutcome::Skipped)
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
