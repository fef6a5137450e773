// bookmarksync state managers
// Managers own mutable state: the server-side collection and the client-side trees.

pub mod local_tree;
pub mod reconciler;
pub mod tree_importer;
