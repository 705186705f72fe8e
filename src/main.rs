//! `kiwix-manager` binary: serve the management API for one ZIM directory.

use clap::Parser;
use kiwix_manager::{Config, ZimManager, run_with_shutdown};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Manage the ZIM files served by kiwix-serve
#[derive(Debug, Parser)]
#[command(name = "kiwix-manager", version, about)]
struct Cli {
    /// JSON configuration file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the ZIM files
    #[arg(long)]
    storage_path: Option<PathBuf>,

    /// Port for the HTTP API
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind the HTTP API to
    #[arg(long)]
    host: Option<IpAddr>,

    /// Maximum upload size in MiB
    #[arg(long, value_name = "MIB")]
    max_upload_size: Option<u64>,

    /// kiwix library XML that finished downloads are registered in
    #[arg(long)]
    library_path: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info,kiwix_manager=debug")]
    log_level: String,
}

impl Cli {
    fn load_config(&self) -> kiwix_manager::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(storage_path) = &self.storage_path {
            config.storage.storage_path = storage_path.clone();
        }
        if let Some(mib) = self.max_upload_size {
            config.storage.max_upload_size_bytes = mib.saturating_mul(BYTES_PER_MIB);
        }
        if let Some(library_path) = &self.library_path {
            config.library.library_path = Some(library_path.clone());
        }

        let bind = config.server.api.bind_address;
        config.server.api.bind_address = SocketAddr::new(
            self.host.unwrap_or(bind.ip()),
            self.port.unwrap_or(bind.port()),
        );

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

async fn run(cli: Cli) -> kiwix_manager::Result<()> {
    let config = cli.load_config()?;
    tracing::info!(
        storage = %config.storage.storage_path.display(),
        address = %config.server.api.bind_address,
        "Starting kiwix-manager"
    );

    let manager = Arc::new(ZimManager::new(config).await?);

    let queued = manager.queue_startup_urls().await;
    if !queued.is_empty() {
        tracing::info!(count = queued.len(), "Queued startup downloads");
    }

    run_with_shutdown(manager).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "kiwix-manager failed");
            ExitCode::FAILURE
        }
    }
}
