//! Client-side startup sync.
//!
//! Reads the host tree once, then runs two things side by side: the bulk
//! upload of the raw snapshot, and the replay of the tree's top-level
//! folders into a new "Synced Bookmarks" folder of the same host tree.
//! Neither outcome gates the other.

use tracing::{info, warn};

use crate::managers::local_tree::{BookmarkTreeReader, BookmarkTreeWriter};
use crate::managers::tree_importer::{import_tree, ImportSummary};
use crate::services::sync_transport::HttpTransport;
use crate::types::bookmark::BookmarkNode;
use crate::types::errors::{ImportError, TransportError};
use crate::types::sync::FullSnapshot;

/// What the startup sync achieved.
#[derive(Debug)]
pub struct StartupReport {
    /// Number of root records in the uploaded snapshot.
    pub snapshot_roots: usize,
    /// `None` when the upload was delivered and accepted.
    pub upload_error: Option<TransportError>,
    /// Id of the synced folder, when it could be created.
    pub synced_folder_id: Option<String>,
    pub import: Result<ImportSummary, ImportError>,
}

impl StartupReport {
    pub fn uploaded(&self) -> bool {
        self.upload_error.is_none()
    }
}

/// Drives the startup flow against a host tree.
pub struct SyncClient {
    transport: HttpTransport,
    synced_folder_name: String,
}

impl SyncClient {
    pub fn new(transport: HttpTransport, synced_folder_name: &str) -> Self {
        Self {
            transport,
            synced_folder_name: synced_folder_name.to_string(),
        }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Uploads the full tree and replays it into a synced folder.
    ///
    /// Upload failures are logged and reported, never raised: the transport
    /// is best-effort.
    pub async fn initial_sync<T>(&self, tree: &mut T) -> StartupReport
    where
        T: BookmarkTreeReader + BookmarkTreeWriter,
    {
        let roots = tree.get_full_tree();
        let snapshot = FullSnapshot::from_tree(&roots);
        let snapshot_roots = snapshot.bookmarks.len();

        let upload = self.transport.send_snapshot(&snapshot);
        let replay = async move {
            let top_level: Vec<BookmarkNode> = roots
                .iter()
                .flat_map(|root| root.child_nodes().iter().cloned())
                .collect();
            self.replay(tree, &top_level)
        };
        let (upload_result, (synced_folder_id, import)) = tokio::join!(upload, replay);

        let upload_error = match upload_result {
            Ok(()) => {
                info!("Uploaded initial snapshot ({} roots)", snapshot_roots);
                None
            }
            Err(e) => {
                warn!("Failed to upload initial bookmarks: {}", e);
                Some(e)
            }
        };

        StartupReport {
            snapshot_roots,
            upload_error,
            synced_folder_id,
            import,
        }
    }

    fn replay<W: BookmarkTreeWriter>(
        &self,
        tree: &mut W,
        nodes: &[BookmarkNode],
    ) -> (Option<String>, Result<ImportSummary, ImportError>) {
        let folder_id = match tree.create_node(None, &self.synced_folder_name, None) {
            Ok(id) => id,
            Err(source) => {
                warn!("Failed to create '{}' folder: {}", self.synced_folder_name, source);
                return (None, Err(ImportError::Aborted { created: 0, source }));
            }
        };

        let result = import_tree(tree, nodes, &folder_id);
        match &result {
            Ok(summary) => info!(
                "Copied {} folders and {} bookmarks into '{}'",
                summary.folders, summary.leaves, self.synced_folder_name
            ),
            Err(e) => warn!("Failed to copy bookmarks: {}", e),
        }
        (Some(folder_id), result)
    }
}
