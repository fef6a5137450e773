//! bookmarksync client
//!
//! Drives the client side against a bookmark tree on disk: the startup
//! upload and replay, single mutation notifications, and the settings file.
//!
//! Usage:
//!   bookmarksync upload --bookmarks ~/.config/chromium/Default/Bookmarks
//!   bookmarksync upload --firefox
//!   bookmarksync changed --id 42 --title "New title"
//!   bookmarksync config set client.server_url '"http://sync.lan:6758"'

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bookmarksync::managers::local_tree::{BookmarkTreeReader, LocalTree};
use bookmarksync::platform;
use bookmarksync::services::change_translator::ChangeEventTranslator;
use bookmarksync::services::chromium_profile::load_tree_file;
use bookmarksync::services::firefox_profile::find_places_file;
use bookmarksync::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmarksync::services::sync_client::SyncClient;
use bookmarksync::services::sync_transport::{ActionSink, HttpTransport};
use bookmarksync::types::bookmark::BookmarkNode;
use bookmarksync::types::errors::TransportError;
use bookmarksync::types::settings::ClientSettings;
use bookmarksync::types::sync::{MutationEvent, RemoveInfo, SyncAction};

#[derive(Parser, Debug)]
#[command(name = "bookmarksync")]
#[command(about = "Bookmark sync client")]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Sync server base URL (overrides client.server_url)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload the whole tree and copy it into the synced folder
    Upload {
        /// Chromium `Bookmarks` file, Firefox `places.sqlite`, or a
        /// getTree-shaped JSON array
        #[arg(short, long)]
        bookmarks: Option<PathBuf>,

        /// Without --bookmarks, read the default Firefox profile instead of Chromium
        #[arg(long)]
        firefox: bool,

        /// Write the resulting tree (synced folder included) here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report a newly created bookmark
    Created {
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        parent_id: Option<String>,
    },
    /// Report a removed bookmark
    Removed {
        #[arg(long)]
        id: String,
        #[arg(long)]
        parent_id: Option<String>,
    },
    /// Report changed fields of a bookmark
    Changed {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Inspect or edit the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Set one value by dot-notation key; VALUE is JSON, or a bare string
    Set { key: String, value: String },
    /// Restore the defaults
    Reset,
    /// Print the settings file location
    Path,
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

fn transport_for(client: &ClientSettings) -> Result<HttpTransport> {
    HttpTransport::new(
        &client.server_url,
        Duration::from_secs(client.request_timeout_secs),
    )
    .context("Failed to build HTTP client")
}

fn default_tree_path(firefox: bool) -> Result<PathBuf> {
    if !firefox {
        return Ok(platform::chromium_bookmarks_path());
    }
    let ini = platform::firefox_profiles_ini_path();
    find_places_file(&ini)
        .with_context(|| format!("No usable Firefox profile in {}", ini.display()))
}

async fn upload(
    client: &ClientSettings,
    bookmarks: Option<PathBuf>,
    firefox: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let path = match bookmarks {
        Some(path) => path,
        None => default_tree_path(firefox)?,
    };
    let mut tree: LocalTree = load_tree_file(&path)
        .with_context(|| format!("Failed to load bookmarks from {}", path.display()))?;
    info!("Loaded {} nodes from {}", tree.node_count(), path.display());

    let sync = SyncClient::new(transport_for(client)?, &client.synced_folder_name);
    let report = sync.initial_sync(&mut tree).await;

    if let Some(out) = output {
        let json = serde_json::to_string_pretty(&tree.get_full_tree())
            .context("Failed to serialize tree")?;
        fs::write(&out, json).with_context(|| format!("Failed to write {}", out.display()))?;
        info!("Wrote tree to {}", out.display());
    }

    if let Err(e) = &report.import {
        warn!("Synced folder is incomplete: {}", e);
    }
    if let Some(e) = report.upload_error {
        bail!("Initial upload failed: {}", e);
    }
    Ok(())
}

type SpawnedSend = Result<JoinHandle<Result<(), TransportError>>, TransportError>;

/// Sink that keeps its spawned sends so a one-shot process can wait on them.
struct PendingSends {
    transport: HttpTransport,
    sends: Mutex<Vec<(String, SpawnedSend)>>,
}

impl ActionSink for PendingSends {
    fn dispatch(&self, action: SyncAction) {
        let label = format!("{} for {}", action.kind(), action.target_id());
        let send = self.transport.spawn_action(action);
        self.sends
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((label, send));
    }
}

impl PendingSends {
    async fn finish(self) -> Result<()> {
        let sends = self
            .sends
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        for (label, send) in sends {
            send?
                .await
                .context("Send task aborted")?
                .with_context(|| format!("Failed to sync {}", label))?;
            info!("Synced {}", label);
        }
        Ok(())
    }
}

async fn notify(client: &ClientSettings, event: MutationEvent) -> Result<()> {
    let translator = ChangeEventTranslator::new(PendingSends {
        transport: transport_for(client)?,
        sends: Mutex::new(Vec::new()),
    });
    translator.handle(event);
    translator.into_sink().finish().await
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn config(engine: &mut SettingsEngine, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(engine.get_settings())?);
        }
        ConfigAction::Set { key, value } => {
            engine
                .set_value(&key, parse_value(&value))
                .with_context(|| format!("Failed to set {}", key))?;
            println!("{} updated", key);
        }
        ConfigAction::Reset => {
            engine.reset().context("Failed to reset settings")?;
            println!("Settings reset to defaults");
        }
        ConfigAction::Path => println!("{}", engine.get_config_path()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut engine = SettingsEngine::new(cli.config.clone());
    engine
        .load()
        .with_context(|| format!("Failed to load settings from {}", engine.get_config_path()))?;

    let mut client = engine.get_settings().client.clone();
    if let Some(server) = cli.server {
        client.server_url = server;
    }

    match cli.command {
        Command::Upload {
            bookmarks,
            firefox,
            output,
        } => upload(&client, bookmarks, firefox, output).await,
        Command::Created {
            id,
            title,
            url,
            parent_id,
        } => {
            let mut node = match url.as_deref() {
                Some(url) => BookmarkNode::leaf(&id, &title, url),
                None => BookmarkNode::folder(&id, &title, Vec::new()),
            };
            node.parent_id = parent_id;
            notify(&client, MutationEvent::Created { id, node }).await
        }
        Command::Removed { id, parent_id } => {
            let remove_info = RemoveInfo {
                parent_id,
                ..RemoveInfo::default()
            };
            notify(&client, MutationEvent::Removed { id, remove_info }).await
        }
        Command::Changed { id, title, url } => {
            let mut change_info = Map::new();
            if let Some(title) = title {
                change_info.insert("title".to_string(), Value::String(title));
            }
            if let Some(url) = url {
                change_info.insert("url".to_string(), Value::String(url));
            }
            if change_info.is_empty() {
                bail!("Nothing changed: pass --title and/or --url");
            }
            notify(&client, MutationEvent::Changed { id, change_info }).await
        }
        Command::Config { action } => config(&mut engine, action),
    }
}
