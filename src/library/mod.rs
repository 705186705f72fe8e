//! kiwix-serve library registration
//!
//! After a download completes the file can be added to the library XML that
//! kiwix-serve reads. Registration goes through the [`LibraryRegistrar`]
//! trait so the external `kiwix-manage` tool stays optional:
//! - [`CliLibraryRegistrar`] runs `kiwix-manage`
//! - [`NoOpLibraryRegistrar`] is used when no library is configured or the
//!   binary cannot be found

mod cli;
mod noop;
mod traits;

pub use cli::CliLibraryRegistrar;
pub use noop::NoOpLibraryRegistrar;
pub use traits::{LibraryRegistrar, RegisterOutcome};

use crate::config::LibraryConfig;
use std::sync::Arc;

/// Pick the registrar for `config`
pub fn registrar_from_config(config: &LibraryConfig) -> Arc<dyn LibraryRegistrar> {
    let Some(library_path) = config.library_path.clone() else {
        return Arc::new(NoOpLibraryRegistrar);
    };

    if let Some(ref binary) = config.kiwix_manage_path {
        Arc::new(CliLibraryRegistrar::new(binary.clone(), library_path))
    } else if config.search_path {
        match CliLibraryRegistrar::from_path(library_path) {
            Some(registrar) => Arc::new(registrar),
            None => {
                tracing::warn!(
                    "Library path configured but kiwix-manage was not found in PATH; \
                     downloads will not be registered"
                );
                Arc::new(NoOpLibraryRegistrar)
            }
        }
    } else {
        Arc::new(NoOpLibraryRegistrar)
    }
}
