//! Reads a host bookmark tree out of a Firefox profile.
//!
//! Firefox keeps bookmarks in `places.sqlite`: `moz_bookmarks` holds the
//! hierarchy (`parent`, `position`) and `moz_places` the URLs, joined on
//! `moz_bookmarks.fk`. Profiles are listed in `profiles.ini`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::managers::local_tree::LocalTree;
use crate::types::bookmark::BookmarkNode;
use crate::types::errors::TreeError;

pub const PLACES_FILE: &str = "places.sqlite";

const TYPE_BOOKMARK: i64 = 1;
const TYPE_FOLDER: i64 = 2;

/// GUID of the "Other Bookmarks" folder, where new nodes land by default.
const UNFILED_GUID: &str = "unfiled_____";

#[derive(Debug)]
struct PlacesRow {
    id: i64,
    kind: i64,
    parent: i64,
    title: Option<String>,
    url: Option<String>,
    date_added: Option<i64>,
    guid: Option<String>,
}

fn sql_error(e: rusqlite::Error) -> TreeError {
    TreeError::Parse(format!("places database: {}", e))
}

fn read_rows(conn: &Connection) -> Result<Vec<PlacesRow>, TreeError> {
    let mut stmt = conn
        .prepare(
            "SELECT b.id, b.type, b.parent, b.title, p.url, b.dateAdded, b.guid
             FROM moz_bookmarks b
             LEFT JOIN moz_places p ON b.fk = p.id
             ORDER BY b.parent, b.position",
        )
        .map_err(sql_error)?;

    let rows = stmt
        .query_map([], |row| {
            Ok(PlacesRow {
                id: row.get(0)?,
                kind: row.get(1)?,
                parent: row.get(2)?,
                title: row.get(3)?,
                url: row.get(4)?,
                date_added: row.get(5)?,
                guid: row.get(6)?,
            })
        })
        .map_err(sql_error)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(sql_error)
}

fn build(
    row: &PlacesRow,
    by_parent: &HashMap<i64, Vec<&PlacesRow>>,
    index: usize,
) -> Option<BookmarkNode> {
    let id = row.id.to_string();
    let title = row.title.as_deref().unwrap_or_default();
    let mut node = match (row.kind, row.url.as_deref()) {
        (TYPE_BOOKMARK, Some(url)) => BookmarkNode::leaf(&id, title, url),
        (TYPE_FOLDER, _) => {
            let mut children = Vec::new();
            for child in by_parent.get(&row.id).map(Vec::as_slice).unwrap_or_default() {
                if let Some(node) = build(child, by_parent, children.len()) {
                    children.push(node);
                }
            }
            BookmarkNode::folder(&id, title, children)
        }
        // Separators and dangling bookmarks have no counterpart in the tree.
        _ => return None,
    };
    if row.parent != 0 {
        node.parent_id = Some(row.parent.to_string());
        node.index = Some(index as u32);
    }
    // PRTime: microseconds since the Unix epoch.
    node.date_added = row.date_added.filter(|t| *t > 0).map(|t| t / 1000);
    Some(node)
}

/// Loads the bookmark tree of a `places.sqlite` file, opened read-only. The
/// root is the row whose parent is `0`; separators are skipped. A running
/// Firefox keeps the file locked, so copy it first in that case.
pub fn load_places(path: &Path) -> Result<LocalTree, TreeError> {
    if !path.is_file() {
        return Err(TreeError::Parse(format!("{} does not exist", path.display())));
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(sql_error)?;
    let rows = read_rows(&conn)?;

    let mut by_parent: HashMap<i64, Vec<&PlacesRow>> = HashMap::new();
    for row in &rows {
        by_parent.entry(row.parent).or_default().push(row);
    }
    let root = by_parent
        .get(&0)
        .and_then(|roots| roots.first())
        .ok_or_else(|| TreeError::Parse("places database has no root folder".to_string()))?;
    let root = build(root, &by_parent, 0)
        .ok_or_else(|| TreeError::Parse("places root is not a folder".to_string()))?;

    let mut tree = LocalTree::from_root(root);
    let unfiled = rows
        .iter()
        .find(|row| row.guid.as_deref() == Some(UNFILED_GUID) && row.kind == TYPE_FOLDER);
    if let Some(row) = unfiled {
        tree.set_default_parent(&row.id.to_string());
    }
    debug!("Loaded {} nodes from {}", tree.node_count(), path.display());
    Ok(tree)
}

/// The `Path=` entries of a `profiles.ini`, in file order.
pub fn profile_entries(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Path="))
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .collect()
}

/// Returns the first profile listed in `ini` that has a `places.sqlite`.
/// Relative entries resolve against the directory holding `ini`.
pub fn find_profile_path(ini: &Path) -> Result<PathBuf, TreeError> {
    let content = fs::read_to_string(ini)
        .map_err(|e| TreeError::Parse(format!("Failed to read {}: {}", ini.display(), e)))?;
    let entries = profile_entries(&content);
    if entries.is_empty() {
        return Err(TreeError::Parse(format!(
            "no profile path found in {}",
            ini.display()
        )));
    }

    let base = ini.parent().unwrap_or_else(|| Path::new(""));
    entries
        .iter()
        .map(|entry| base.join(entry))
        .find(|profile| profile.join(PLACES_FILE).is_file())
        .ok_or_else(|| {
            TreeError::Parse(format!(
                "no profile with {} found in {}",
                PLACES_FILE,
                ini.display()
            ))
        })
}

/// `places.sqlite` of the first usable profile in `ini`.
pub fn find_places_file(ini: &Path) -> Result<PathBuf, TreeError> {
    Ok(find_profile_path(ini)?.join(PLACES_FILE))
}
