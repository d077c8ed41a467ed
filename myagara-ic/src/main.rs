//! myagara-ic - Image Classification service
//!
//! Accepts image uploads, forwards each one to the remote classifier and
//! stores the resulting label and confidence in SQLite.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use myagara_common::config::{load_toml_config_or_default, ConfigFileStatus};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use myagara_ic::config::{ConfigOverrides, ServiceConfig, MODULE_NAME};
use myagara_ic::db::SqliteRecordStore;
use myagara_ic::services::{HttpClassifierClient, StagingStore, UploadOrchestrator};
use myagara_ic::AppState;

/// Command-line arguments for myagara-ic
#[derive(Parser, Debug)]
#[command(name = "myagara-ic")]
#[command(about = "Image classification service for Myagara")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/myagara/myagara-ic.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder holding the database and default staging directory
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MYAGARA_PORT")]
    port: Option<u16>,

    /// Classifier endpoint receiving multipart field `image`
    #[arg(long, env = "MYAGARA_CLASSIFIER_URL")]
    classifier_url: Option<String>,

    /// Directory uploads are staged in before classification
    #[arg(long, env = "MYAGARA_STAGING_DIR")]
    staging_dir: Option<PathBuf>,

    #[arg(long)]
    classifier_timeout_secs: Option<u64>,

    #[arg(long)]
    max_upload_bytes: Option<usize>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            root_folder: args.root_folder,
            host: args.host,
            port: args.port,
            classifier_url: args.classifier_url,
            classifier_timeout_secs: args.classifier_timeout_secs,
            staging_dir: args.staging_dir,
            max_upload_bytes: args.max_upload_bytes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();

    let (toml_config, config_status) =
        load_toml_config_or_default(args.config.take().as_deref(), MODULE_NAME);

    // RUST_LOG wins over the [logging] level from the config file
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=info", toml_config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting {} v{} [{}] built {} ({})",
        MODULE_NAME,
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_status {
        ConfigFileStatus::Loaded(path) => info!("Config file: {}", path.display()),
        ConfigFileStatus::Missing => info!("No config file found, using defaults"),
        ConfigFileStatus::Invalid { path, error } => warn!(
            "Ignoring invalid config file {}: {}. Using defaults",
            path.display(),
            error
        ),
    }

    let config = ServiceConfig::resolve(args.into(), &toml_config)
        .context("Invalid configuration")?;

    info!("Root folder: {}", config.root_folder.display());
    info!("Database: {}", config.database_path.display());
    info!("Staging directory: {}", config.staging_dir.display());
    info!("Classifier: {}", config.classifier_url);

    config
        .prepare_root_folder()
        .context("Failed to initialize root folder")?;

    let pool = myagara_common::db::init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    let classifier = HttpClassifierClient::new(config.classifier_url.clone(), config.classifier_timeout)
        .context("Failed to build classifier client")?;

    let orchestrator = UploadOrchestrator::new(
        StagingStore::new(config.staging_dir.clone()),
        Arc::new(classifier),
        Arc::new(SqliteRecordStore::new(pool)),
    );

    let state = AppState::new(Arc::new(orchestrator), config.max_upload_bytes);
    let app = myagara_ic::build_router(state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
