//! Reads a host bookmark tree from disk.
//!
//! Two JSON layouts are understood: a Chromium profile `Bookmarks` file
//! (`{"roots": {"bookmark_bar": ..., "other": ..., "synced": ...}}`) and a
//! `getTree`-shaped JSON array of [`BookmarkNode`]s. `.sqlite` files go to
//! the Firefox reader.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::managers::local_tree::LocalTree;
use crate::services::firefox_profile;
use crate::types::bookmark::BookmarkNode;
use crate::types::errors::TreeError;

/// Microseconds between 1601-01-01 (Chromium's epoch) and 1970-01-01.
const WINDOWS_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

#[derive(Debug, Deserialize)]
struct ChromiumFile {
    roots: ChromiumRoots,
}

#[derive(Debug, Deserialize)]
struct ChromiumRoots {
    bookmark_bar: Option<ChromiumNode>,
    other: Option<ChromiumNode>,
    synced: Option<ChromiumNode>,
}

#[derive(Debug, Deserialize)]
struct ChromiumNode {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    children: Vec<ChromiumNode>,
    #[serde(default)]
    date_added: Option<String>,
}

/// Chromium stores timestamps as decimal strings of microseconds since 1601.
fn chromium_time_to_millis(raw: &str) -> Option<i64> {
    let micros: i64 = raw.parse().ok()?;
    if micros == 0 {
        return None;
    }
    Some((micros - WINDOWS_EPOCH_OFFSET_MICROS) / 1000)
}

fn convert(node: ChromiumNode, parent_id: &str, index: usize) -> BookmarkNode {
    let mut converted = if node.kind == "url" || (node.kind.is_empty() && node.url.is_some()) {
        BookmarkNode::leaf(&node.id, &node.name, node.url.as_deref().unwrap_or_default())
    } else {
        let id = node.id.clone();
        let children = node
            .children
            .into_iter()
            .enumerate()
            .map(|(i, child)| convert(child, &id, i))
            .collect();
        BookmarkNode::folder(&node.id, &node.name, children)
    };
    converted.parent_id = Some(parent_id.to_string());
    converted.index = Some(index as u32);
    converted.date_added = node.date_added.as_deref().and_then(chromium_time_to_millis);
    converted
}

/// Parses the contents of a Chromium `Bookmarks` file into a tree shaped
/// like `chrome.bookmarks.getTree()`: root `"0"` holding the bookmark bar,
/// other bookmarks and mobile bookmarks folders. Nodes created without a
/// parent land in "Other bookmarks", as in the browser.
pub fn parse_chromium_bookmarks(content: &str) -> Result<LocalTree, TreeError> {
    let file: ChromiumFile =
        serde_json::from_str(content).map_err(|e| TreeError::Parse(e.to_string()))?;

    let roots = [file.roots.bookmark_bar, file.roots.other, file.roots.synced];
    let mut top_level = Vec::new();
    let mut other_id = None;
    for (slot, root) in roots.into_iter().enumerate() {
        if let Some(root) = root {
            let converted = convert(root, "0", top_level.len());
            if slot == 1 {
                other_id = Some(converted.id.clone());
            }
            top_level.push(converted);
        }
    }

    let mut tree = LocalTree::from_root(BookmarkNode::folder("0", "", top_level));
    if let Some(id) = other_id {
        tree.set_default_parent(&id);
    }
    Ok(tree)
}

/// Parses a `getTree`-shaped JSON array. A single folder is taken as the
/// root; several top-level nodes are wrapped in a synthetic root `"0"`.
pub fn parse_tree_json(content: &str) -> Result<LocalTree, TreeError> {
    let mut nodes: Vec<BookmarkNode> =
        serde_json::from_str(content).map_err(|e| TreeError::Parse(e.to_string()))?;

    if nodes.len() == 1 && nodes[0].is_folder() {
        let root = nodes.remove(0);
        return Ok(LocalTree::from_root(root));
    }
    Ok(LocalTree::from_root(BookmarkNode::folder("0", "", nodes)))
}

/// Loads a tree file. A `.sqlite` extension means Firefox `places.sqlite`;
/// otherwise the JSON layout is detected by a top-level `roots` key.
pub fn load_tree_file(path: &Path) -> Result<LocalTree, TreeError> {
    if path.extension().and_then(|ext| ext.to_str()) == Some("sqlite") {
        return firefox_profile::load_places(path);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| TreeError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;

    let layout: Value =
        serde_json::from_str(&content).map_err(|e| TreeError::Parse(e.to_string()))?;
    if layout.get("roots").is_some() {
        parse_chromium_bookmarks(&content)
    } else {
        parse_tree_json(&content)
    }
}
