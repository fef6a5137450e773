// bookmarksync platform paths for macOS
// Config:    ~/Library/Application Support/bookmarksync
// Data:      ~/Library/Application Support/bookmarksync/data
// Chromium:  ~/Library/Application Support/Chromium/Default/Bookmarks
// Firefox:   ~/Library/Application Support/Firefox/profiles.ini

use std::env;
use std::path::PathBuf;

fn application_support() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
        .join("Library")
        .join("Application Support")
}

pub fn get_config_dir() -> PathBuf {
    application_support().join("bookmarksync")
}

pub fn get_data_dir() -> PathBuf {
    get_config_dir().join("data")
}

pub fn chromium_bookmarks_path() -> PathBuf {
    application_support()
        .join("Chromium")
        .join("Default")
        .join("Bookmarks")
}

pub fn firefox_profiles_ini_path() -> PathBuf {
    application_support().join("Firefox").join("profiles.ini")
}
