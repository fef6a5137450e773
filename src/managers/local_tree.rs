//! Host bookmark tree interfaces and an in-process implementation.
//!
//! The browser owns the real tree; the sync core only reads a full snapshot
//! and creates nodes. `LocalTree` plays the host for the CLI client and tests.

use uuid::Uuid;

use crate::types::bookmark::BookmarkNode;
use crate::types::errors::TreeError;

/// Read side of the host tree (`getTree`).
pub trait BookmarkTreeReader {
    /// Returns the root-wrapped tree: a single root folder whose children
    /// are the top-level folders.
    fn get_full_tree(&self) -> Vec<BookmarkNode>;
}

/// Write side of the host tree (`create`).
pub trait BookmarkTreeWriter {
    /// Creates a leaf (`url` is `Some`) or an empty folder under `parent_id`,
    /// appended after the existing children. `None` lets the host pick its
    /// default location. Returns the new node's id.
    fn create_node(&mut self, parent_id: Option<&str>, title: &str, url: Option<&str>) -> Result<String, TreeError>;
}

/// In-memory bookmark tree with freshly generated node ids.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: BookmarkNode,
    default_parent_id: String,
}

impl LocalTree {
    /// An empty tree: a root folder with id `"0"` and no children.
    pub fn new() -> Self {
        Self::from_root(BookmarkNode::folder("0", "", Vec::new()))
    }

    /// Wraps an existing root. Nodes created without a parent go directly
    /// under the root until [`LocalTree::set_default_parent`] says otherwise.
    pub fn from_root(mut root: BookmarkNode) -> Self {
        if root.children.is_none() && root.url.is_none() {
            root.children = Some(Vec::new());
        }
        let default_parent_id = root.id.clone();
        Self {
            root,
            default_parent_id,
        }
    }

    pub fn set_default_parent(&mut self, id: &str) {
        self.default_parent_id = id.to_string();
    }

    pub fn root(&self) -> &BookmarkNode {
        &self.root
    }

    pub fn find(&self, id: &str) -> Option<&BookmarkNode> {
        fn walk<'a>(node: &'a BookmarkNode, id: &str) -> Option<&'a BookmarkNode> {
            if node.id == id {
                return Some(node);
            }
            node.child_nodes().iter().find_map(|child| walk(child, id))
        }
        walk(&self.root, id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut BookmarkNode> {
        fn walk<'a>(node: &'a mut BookmarkNode, id: &str) -> Option<&'a mut BookmarkNode> {
            if node.id == id {
                return Some(node);
            }
            node.children
                .as_mut()?
                .iter_mut()
                .find_map(|child| walk(child, id))
        }
        walk(&mut self.root, id)
    }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize {
        fn count(node: &BookmarkNode) -> usize {
            node.child_nodes().iter().map(|c| 1 + count(c)).sum()
        }
        count(&self.root)
    }
}

impl Default for LocalTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BookmarkTreeReader for LocalTree {
    fn get_full_tree(&self) -> Vec<BookmarkNode> {
        vec![self.root.clone()]
    }
}

impl BookmarkTreeWriter for LocalTree {
    fn create_node(&mut self, parent_id: Option<&str>, title: &str, url: Option<&str>) -> Result<String, TreeError> {
        let parent_id = parent_id.unwrap_or(&self.default_parent_id).to_string();
        let parent = self
            .find_mut(&parent_id)
            .ok_or_else(|| TreeError::ParentNotFound(parent_id.clone()))?;
        if !parent.is_folder() {
            return Err(TreeError::NotAFolder(parent_id));
        }

        let id = Uuid::new_v4().to_string();
        let siblings = parent.children.get_or_insert_with(Vec::new);
        let mut node = match url {
            Some(url) => BookmarkNode::leaf(&id, title, url),
            None => BookmarkNode::folder(&id, title, Vec::new()),
        };
        node.parent_id = Some(parent_id);
        node.index = Some(siblings.len() as u32);
        siblings.push(node);
        Ok(id)
    }
}
