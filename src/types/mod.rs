// bookmarksync shared type definitions
// Each submodule defines types used across the client and server sides.

pub mod bookmark;
pub mod errors;
pub mod settings;
pub mod sync;
