use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node of the client-side bookmark tree, shaped like the browser
/// bookmark API reports it (camelCase metadata fields).
///
/// A node with a `url` is a leaf; a node without one is a folder and owns an
/// ordered (possibly empty) list of children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BookmarkNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
}

impl BookmarkNode {
    /// Creates a leaf node.
    pub fn leaf(id: &str, title: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            url: Some(url.to_string()),
            children: None,
            parent_id: None,
            index: None,
            date_added: None,
        }
    }

    /// Creates a folder node with the given children.
    pub fn folder(id: &str, title: &str, children: Vec<BookmarkNode>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            url: None,
            children: Some(children),
            parent_id: None,
            index: None,
            date_added: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }

    /// Children of a folder in sibling order. Leaves have none.
    pub fn child_nodes(&self) -> &[BookmarkNode] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// A server-side bookmark record in the flat collection.
///
/// Only `id` is interpreted. Every other field (`title`, `url` and whatever
/// the host reported) is kept verbatim, with its JSON type, and serialized
/// back alongside the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarkRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl BookmarkRecord {
    pub fn new(id: &str, title: &str, url: Option<&str>) -> Self {
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title.to_string()));
        if let Some(url) = url {
            fields.insert("url".to_string(), Value::String(url.to_string()));
        }
        Self {
            id: id.to_string(),
            fields,
        }
    }

    /// Projects a tree node onto a record. Host metadata and nested
    /// children (for snapshot roots) travel as plain fields.
    pub fn from_node(node: &BookmarkNode) -> Self {
        let mut record = Self::new(&node.id, &node.title, node.url.as_deref());
        let fields = &mut record.fields;
        if let Some(parent_id) = &node.parent_id {
            fields.insert("parentId".to_string(), Value::String(parent_id.clone()));
        }
        if let Some(index) = node.index {
            fields.insert("index".to_string(), Value::from(index));
        }
        if let Some(date_added) = node.date_added {
            fields.insert("dateAdded".to_string(), Value::from(date_added));
        }
        if let Some(children) = &node.children {
            fields.insert(
                "children".to_string(),
                serde_json::to_value(children).unwrap_or_default(),
            );
        }
        record
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The title, when it is stored as a string.
    pub fn title(&self) -> Option<&str> {
        self.field("title").and_then(Value::as_str)
    }

    /// The url, when it is stored as a string.
    pub fn url(&self) -> Option<&str> {
        self.field("url").and_then(Value::as_str)
    }

    /// Shallow-merges changed fields into this record.
    ///
    /// Each named field is stored as given, everything else is retained. An
    /// `id` key in `fields` is ignored: a change never re-keys a record.
    pub fn merge(&mut self, fields: &Map<String, Value>) {
        for (key, value) in fields {
            if key != "id" {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }
}
