// bookmarksync services
// Services move bookmarks between the host tree, the wire, and durable storage.

pub mod change_translator;
pub mod chromium_profile;
pub mod durable_store;
pub mod firefox_profile;
pub mod settings_engine;
pub mod sync_client;
pub mod sync_transport;
