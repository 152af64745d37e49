use anyhow::{Context, Result};
use clap::Parser;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use student_directory::{
    api,
    config::{self, ConfigOverrides, StorageBackend},
    logging, store,
};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "student-directory",
    about = "HTTP directory of student records backed by MongoDB"
)]
struct Cli {
    /// Listening port (overrides `PORT`).
    #[arg(long)]
    port: Option<u16>,
    /// MongoDB connection string (overrides `MONGO_URI`).
    #[arg(long)]
    mongo_uri: Option<String>,
    /// Storage backend: `mongo` or `memory` (overrides `STORAGE_BACKEND`).
    #[arg(long)]
    backend: Option<StorageBackend>,
    /// Log file path (overrides `STUDENT_DIRECTORY_LOG_FILE`).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            server_port: self.port,
            mongo_uri: self.mongo_uri,
            storage_backend: self.backend,
            log_file: self.log_file,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config =
        config::init_config(cli.into_overrides()).context("failed to load configuration")?;
    logging::init_tracing(&config);

    let store = store::connect(&config)
        .await
        .context("failed to initialize student store")?;
    let app = api::create_router(store);

    let port = config.server_port;
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}
