// bookmarksync platform paths for Windows
// Config:    %APPDATA%/bookmarksync
// Data:      %LOCALAPPDATA%/bookmarksync
// Chromium:  %LOCALAPPDATA%/Chromium/User Data/Default/Bookmarks
// Firefox:   %APPDATA%/Mozilla/Firefox/profiles.ini

use std::env;
use std::path::PathBuf;

fn local_appdata() -> PathBuf {
    PathBuf::from(
        env::var("LOCALAPPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Local")),
    )
}

fn roaming_appdata() -> PathBuf {
    PathBuf::from(
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming")),
    )
}

pub fn get_config_dir() -> PathBuf {
    roaming_appdata().join("bookmarksync")
}

pub fn get_data_dir() -> PathBuf {
    local_appdata().join("bookmarksync")
}

pub fn chromium_bookmarks_path() -> PathBuf {
    local_appdata()
        .join("Chromium")
        .join("User Data")
        .join("Default")
        .join("Bookmarks")
}

pub fn firefox_profiles_ini_path() -> PathBuf {
    roaming_appdata()
        .join("Mozilla")
        .join("Firefox")
        .join("profiles.ini")
}
