//! bookmarksync server
//!
//! Holds the flat bookmark collection and applies the actions clients send.
//!
//! Usage:
//!   bookmarksync-server --port 6758 --store sqlite

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bookmarksync::managers::reconciler::Reconciler;
use bookmarksync::services::durable_store::open_store;
use bookmarksync::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmarksync::sync_handler::build_router;
use bookmarksync::types::settings::StoreBackend;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StoreArg {
    Json,
    Sqlite,
}

impl From<StoreArg> for StoreBackend {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Json => StoreBackend::Json,
            StoreArg::Sqlite => StoreBackend::Sqlite,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "bookmarksync-server")]
#[command(about = "Bookmark sync server")]
struct Args {
    /// Path to the settings file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on (overrides the PORT environment variable)
    #[arg(short, long)]
    port: Option<u16>,

    /// Durable store backend
    #[arg(short, long, value_enum)]
    store: Option<StoreArg>,

    /// Location of the store file
    #[arg(long)]
    store_path: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut engine = SettingsEngine::new(args.config.clone());
    engine
        .load()
        .with_context(|| format!("Failed to load settings from {}", engine.get_config_path()))?;
    engine.apply_env_overrides().context("Invalid environment override")?;

    let server = &mut engine.settings_mut().server;
    if let Some(bind) = args.bind {
        server.bind_address = bind;
    }
    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(store) = args.store {
        server.store_backend = store.into();
    }
    if let Some(path) = args.store_path {
        server.store_path = Some(path.to_string_lossy().to_string());
    }

    let settings = engine.get_settings().server.clone();
    let store_path = engine.store_path();
    info!(
        "Opening {:?} store at {}",
        settings.store_backend,
        store_path.display()
    );
    let store = open_store(settings.store_backend, &store_path)
        .with_context(|| format!("Failed to open store at {}", store_path.display()))?;
    let reconciler = Reconciler::open(store).context("Failed to load bookmark collection")?;
    info!("Loaded {} bookmark records", reconciler.len());

    let app = build_router(Arc::new(reconciler), settings.body_limit_bytes);

    let addr: SocketAddr = format!("{}:{}", settings.bind_address, settings.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}", settings.bind_address))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on port {}", settings.port);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
