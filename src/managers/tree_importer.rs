//! Tree Importer.
//!
//! Replays a hierarchical snapshot into a destination tree under a new
//! parent: a structural copy with freshly assigned ids. The source is never
//! modified and siblings are created in source order.
//!
//! On the first failed `create_node` the walk stops. Nodes created before
//! the failure are left in place; the destination has no rollback.

use tracing::{debug, warn};

use crate::managers::local_tree::BookmarkTreeWriter;
use crate::types::bookmark::BookmarkNode;
use crate::types::errors::{ImportError, TreeError};

/// Counts of nodes created by a completed import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub folders: usize,
    pub leaves: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.folders + self.leaves
    }
}

/// Copies bookmark trees into a [`BookmarkTreeWriter`].
pub struct TreeImporter<'a, W: BookmarkTreeWriter> {
    destination: &'a mut W,
    summary: ImportSummary,
}

impl<'a, W: BookmarkTreeWriter> TreeImporter<'a, W> {
    pub fn new(destination: &'a mut W) -> Self {
        Self {
            destination,
            summary: ImportSummary::default(),
        }
    }

    /// Imports `nodes` (in order) under `parent_id`.
    pub fn import(mut self, nodes: &[BookmarkNode], parent_id: &str) -> Result<ImportSummary, ImportError> {
        match self.import_level(nodes, parent_id) {
            Ok(()) => {
                debug!(
                    "Imported {} folders and {} leaves under {}",
                    self.summary.folders, self.summary.leaves, parent_id
                );
                Ok(self.summary)
            }
            Err(source) => {
                let created = self.summary.total();
                warn!("Import aborted after {} nodes: {}", created, source);
                Err(ImportError::Aborted { created, source })
            }
        }
    }

    fn import_level(&mut self, nodes: &[BookmarkNode], parent_id: &str) -> Result<(), TreeError> {
        for node in nodes {
            match &node.url {
                Some(url) => {
                    self.destination
                        .create_node(Some(parent_id), &node.title, Some(url))?;
                    self.summary.leaves += 1;
                }
                None => {
                    let folder_id = self.destination.create_node(Some(parent_id), &node.title, None)?;
                    self.summary.folders += 1;
                    self.import_level(node.child_nodes(), &folder_id)?;
                }
            }
        }
        Ok(())
    }
}

/// Convenience wrapper around [`TreeImporter::import`].
pub fn import_tree<W: BookmarkTreeWriter>(
    destination: &mut W,
    nodes: &[BookmarkNode],
    parent_id: &str,
) -> Result<ImportSummary, ImportError> {
    TreeImporter::new(destination).import(nodes, parent_id)
}
