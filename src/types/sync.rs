use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::bookmark::{BookmarkNode, BookmarkRecord};
use super::errors::SyncError;

/// A normalized instruction derived from one local tree mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    /// A new record, carrying every field the host reported.
    Created(BookmarkRecord),
    /// Removal by id only.
    Removed(String),
    /// Only the fields that changed; the receiver merges them.
    Changed(String, Map<String, Value>),
}

impl SyncAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            SyncAction::Created(_) => ActionKind::Created,
            SyncAction::Removed(_) => ActionKind::Removed,
            SyncAction::Changed(_, _) => ActionKind::Changed,
        }
    }

    /// Id of the record the action targets.
    pub fn target_id(&self) -> &str {
        match self {
            SyncAction::Created(record) => &record.id,
            SyncAction::Removed(id) => id,
            SyncAction::Changed(id, _) => id,
        }
    }
}

/// Wire tag of a sync action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Created,
    Removed,
    Changed,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Created => "created",
            ActionKind::Removed => "removed",
            ActionKind::Changed => "changed",
        }
    }

    /// Parses a wire tag. Unknown tags yield `SyncError::InvalidAction`.
    pub fn parse(tag: &str) -> Result<Self, SyncError> {
        match tag {
            "created" => Ok(ActionKind::Created),
            "removed" => Ok(ActionKind::Removed),
            "changed" => Ok(ActionKind::Changed),
            other => Err(SyncError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /sync`: `{"action": "...", "bookmark": {...}}`.
///
/// The action is kept as a raw string so that unknown tags reach the
/// handler and can be rejected with a 400 instead of a body-parse error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncEnvelope {
    pub action: String,
    #[serde(default)]
    pub bookmark: Value,
}

impl From<&SyncAction> for SyncEnvelope {
    fn from(action: &SyncAction) -> Self {
        let bookmark = match action {
            SyncAction::Created(record) => serde_json::to_value(record).unwrap_or_default(),
            SyncAction::Removed(id) => serde_json::json!({ "id": id }),
            SyncAction::Changed(id, fields) => {
                let mut body = fields.clone();
                body.insert("id".to_string(), Value::String(id.clone()));
                Value::Object(body)
            }
        };
        Self {
            action: action.kind().as_str().to_string(),
            bookmark,
        }
    }
}

impl TryFrom<SyncEnvelope> for SyncAction {
    type Error = SyncError;

    fn try_from(envelope: SyncEnvelope) -> Result<Self, Self::Error> {
        let kind = ActionKind::parse(&envelope.action)?;

        let Value::Object(mut fields) = envelope.bookmark else {
            return Err(SyncError::InvalidPayload(
                "bookmark must be a JSON object".to_string(),
            ));
        };

        match kind {
            ActionKind::Created => {
                let record: BookmarkRecord = serde_json::from_value(Value::Object(fields))
                    .map_err(|e| SyncError::InvalidPayload(e.to_string()))?;
                Ok(SyncAction::Created(record))
            }
            ActionKind::Removed => {
                let id = take_id(&mut fields)?;
                Ok(SyncAction::Removed(id))
            }
            ActionKind::Changed => {
                let id = take_id(&mut fields)?;
                Ok(SyncAction::Changed(id, fields))
            }
        }
    }
}

fn take_id(fields: &mut Map<String, Value>) -> Result<String, SyncError> {
    match fields.remove("id") {
        Some(Value::String(id)) => Ok(id),
        Some(_) => Err(SyncError::InvalidPayload("bookmark id must be a string".to_string())),
        None => Err(SyncError::InvalidPayload("bookmark id is missing".to_string())),
    }
}

/// Body of `POST /initial-upload`: the whole collection, replacing whatever
/// the server stored before.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FullSnapshot {
    pub bookmarks: Vec<BookmarkRecord>,
}

impl FullSnapshot {
    /// Builds the root-wrapped snapshot of a host tree. Each root keeps its
    /// nested children as an extra field.
    pub fn from_tree(roots: &[BookmarkNode]) -> Self {
        Self {
            bookmarks: roots.iter().map(BookmarkRecord::from_node).collect(),
        }
    }
}

/// Extra detail the host reports on removal. Never forwarded to the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveInfo {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub node: Option<BookmarkNode>,
}

/// A raw tree-mutation notification as fired by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationEvent {
    Created { id: String, node: BookmarkNode },
    Removed { id: String, remove_info: RemoveInfo },
    Changed { id: String, change_info: Map<String, Value> },
}

/// What applying a single action did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// `Created` for a new id.
    Appended,
    /// `Created` for an id already present: replaced in place.
    Replaced,
    Removed,
    Merged,
    /// `Removed` or `Changed` for an id not in the collection.
    Ignored,
}
