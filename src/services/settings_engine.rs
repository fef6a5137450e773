// bookmarksync Settings Engine
// Shared settings file for the client and server binaries. Reads tolerate a
// missing file; every write goes through a temp file and a rename, and the
// in-memory settings change only once the write has landed.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::SyncSettings;

/// Environment variable that overrides `server.port`.
pub const PORT_ENV: &str = "PORT";

pub const SETTINGS_FILE: &str = "settings.json";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<SyncSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &SyncSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// `None` when there is no settings file yet.
fn read_settings(path: &Path) -> Result<Option<SyncSettings>, SettingsError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SettingsError::IoError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };
    serde_json::from_str(&content).map(Some).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to parse {}: {}", path.display(), e))
    })
}

fn write_settings(path: &Path, settings: &SyncSettings) -> Result<(), SettingsError> {
    let io_error = |what: &str, e: std::io::Error| {
        SettingsError::IoError(format!("Failed to {} {}: {}", what, path.display(), e))
    };
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| io_error("create the directory of", e))?;
    }

    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json).map_err(|e| io_error("write", e))?;
    fs::rename(&staging, path).map_err(|e| io_error("replace", e))
}

/// Turns `server.port` into the JSON pointer `/server/port`.
fn pointer_for(key: &str) -> Result<String, SettingsError> {
    if key.split('.').any(str::is_empty) {
        return Err(SettingsError::InvalidKey(format!(
            "'{}' is not a dot-separated settings key",
            key
        )));
    }
    Ok(key.split('.').map(|part| format!("/{}", part)).collect())
}

/// Settings engine that persists [`SyncSettings`] as pretty JSON.
pub struct SettingsEngine {
    config_path: String,
    settings: SyncSettings,
}

impl SettingsEngine {
    /// Uses `path_override` when given, else `settings.json` in the
    /// platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join(SETTINGS_FILE)
                .to_string_lossy()
                .into_owned()
        });
        Self {
            config_path,
            settings: SyncSettings::default(),
        }
    }

    fn path(&self) -> &Path {
        Path::new(&self.config_path)
    }

    /// Writes `settings` and adopts them once the file is in place.
    fn commit(&mut self, settings: SyncSettings) -> Result<(), SettingsError> {
        write_settings(self.path(), &settings)?;
        self.settings = settings;
        Ok(())
    }

    /// Applies environment overrides on top of the loaded settings, in
    /// memory. A later `save` writes them out like any other value.
    pub fn apply_env_overrides(&mut self) -> Result<(), SettingsError> {
        if let Ok(raw) = env::var(PORT_ENV) {
            let port = raw.trim().parse::<u16>().map_err(|e| {
                SettingsError::InvalidValue(format!("{}={}: {}", PORT_ENV, raw, e))
            })?;
            self.settings.server.port = port;
        }
        Ok(())
    }

    /// Mutable access for command-line overrides that should not be persisted.
    pub fn settings_mut(&mut self) -> &mut SyncSettings {
        &mut self.settings
    }

    /// Store location: the configured path, or the backend's default file
    /// name in the platform data directory.
    pub fn store_path(&self) -> PathBuf {
        let server = &self.settings.server;
        match &server.store_path {
            Some(path) => PathBuf::from(path),
            None => platform::get_data_dir().join(server.store_backend.default_file_name()),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the file, falling back to defaults when it does not exist.
    /// Sections missing from the file take their defaults.
    fn load(&mut self) -> Result<SyncSettings, SettingsError> {
        self.settings = read_settings(self.path())?.unwrap_or_default();
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        write_settings(self.path(), &self.settings)
    }

    fn get_settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Replaces one existing value, addressed as `section.field`, then
    /// saves. The result must still deserialize as [`SyncSettings`], so
    /// `server.store_backend` only takes `"json"` or `"sqlite"`.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let pointer = pointer_for(key)?;
        let mut document = serde_json::to_value(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;

        let slot = document
            .pointer_mut(&pointer)
            .ok_or_else(|| SettingsError::InvalidKey(format!("Unknown settings key '{}'", key)))?;
        *slot = value;

        let updated: SyncSettings = serde_json::from_value(document).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for '{}': {}", key, e))
        })?;
        debug!("Setting {} in {}", key, self.config_path);
        self.commit(updated)
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.commit(SyncSettings::default())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
