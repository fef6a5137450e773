// bookmarksync platform paths for Linux
// Config:    ~/.config/bookmarksync
// Data:      ~/.local/share/bookmarksync
// Chromium:  ~/.config/chromium/Default/Bookmarks
// Firefox:   ~/.mozilla/firefox/profiles.ini

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
fn xdg_config_home() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => home_dir().join(".config"),
    }
}

/// Returns the configuration directory for bookmarksync on Linux.
/// Uses `$XDG_CONFIG_HOME/bookmarksync` if set, otherwise `~/.config/bookmarksync`.
pub fn get_config_dir() -> PathBuf {
    xdg_config_home().join("bookmarksync")
}

/// Returns the data directory for bookmarksync on Linux.
/// Uses `$XDG_DATA_HOME/bookmarksync` if set, otherwise `~/.local/share/bookmarksync`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("bookmarksync"),
        _ => home_dir().join(".local").join("share").join("bookmarksync"),
    }
}

/// Chromium keeps its profiles under the XDG config home.
pub fn chromium_bookmarks_path() -> PathBuf {
    xdg_config_home()
        .join("chromium")
        .join("Default")
        .join("Bookmarks")
}

/// Firefox ignores XDG and stays under `~/.mozilla`.
pub fn firefox_profiles_ini_path() -> PathBuf {
    home_dir()
        .join(".mozilla")
        .join("firefox")
        .join("profiles.ini")
}
