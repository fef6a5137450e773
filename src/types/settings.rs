use serde::{Deserialize, Serialize};

/// Default port of the sync server.
pub const DEFAULT_PORT: u16 = 6758;

/// Default name of the local folder the startup import replays into.
pub const SYNCED_FOLDER_NAME: &str = "Synced Bookmarks";

/// Top-level settings container shared by the client and server binaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SyncSettings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub client: ClientSettings,
}

/// Settings for the sync server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Location of the durable store. `None` means the platform data dir.
    #[serde(default)]
    pub store_path: Option<String>,
    pub body_limit_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            store_backend: StoreBackend::Json,
            store_path: None,
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Which durable store backs the server's collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Json,
    Sqlite,
}

impl StoreBackend {
    /// File name used when no explicit store path is configured.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            StoreBackend::Json => "db.json",
            StoreBackend::Sqlite => "bookmarks.db",
        }
    }
}

/// Settings for the client side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSettings {
    pub server_url: String,
    pub synced_folder_name: String,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: format!("http://localhost:{}", DEFAULT_PORT),
            synced_folder_name: SYNCED_FOLDER_NAME.to_string(),
            request_timeout_secs: 30,
        }
    }
}
