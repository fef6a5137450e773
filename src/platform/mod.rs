// bookmarksync platform abstraction
// Provides platform-specific paths for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory for bookmarksync.
///
/// - **Linux**: `~/.config/bookmarksync` (or `$XDG_CONFIG_HOME/bookmarksync`)
/// - **macOS**: `~/Library/Application Support/bookmarksync`
/// - **Windows**: `%APPDATA%/bookmarksync`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory, where the server keeps its
/// store by default.
///
/// - **Linux**: `~/.local/share/bookmarksync` (or `$XDG_DATA_HOME/bookmarksync`)
/// - **macOS**: `~/Library/Application Support/bookmarksync/data`
/// - **Windows**: `%LOCALAPPDATA%/bookmarksync`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Returns the `Bookmarks` file of the default Chromium profile.
///
/// - **Linux**: `~/.config/chromium/Default/Bookmarks`
/// - **macOS**: `~/Library/Application Support/Chromium/Default/Bookmarks`
/// - **Windows**: `%LOCALAPPDATA%/Chromium/User Data/Default/Bookmarks`
pub fn chromium_bookmarks_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::chromium_bookmarks_path()
    }
    #[cfg(target_os = "macos")]
    {
        macos::chromium_bookmarks_path()
    }
    #[cfg(target_os = "windows")]
    {
        windows::chromium_bookmarks_path()
    }
}

/// Returns Firefox's `profiles.ini`.
///
/// - **Linux**: `~/.mozilla/firefox/profiles.ini`
/// - **macOS**: `~/Library/Application Support/Firefox/profiles.ini`
/// - **Windows**: `%APPDATA%/Mozilla/Firefox/profiles.ini`
pub fn firefox_profiles_ini_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::firefox_profiles_ini_path()
    }
    #[cfg(target_os = "macos")]
    {
        macos::firefox_profiles_ini_path()
    }
    #[cfg(target_os = "windows")]
    {
        windows::firefox_profiles_ini_path()
    }
}
