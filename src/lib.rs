//! bookmarksync: mirrors a browser bookmark tree into a flat, durably
//! persisted collection on a sync server.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod database;
pub mod managers;
pub mod platform;
pub mod services;
pub mod sync_handler;
pub mod types;
