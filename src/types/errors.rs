use std::fmt;

// === StoreError ===

/// Errors raised by a durable store while loading or saving the collection.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io(String),
    /// The stored document could not be encoded or decoded.
    Serialization(String),
    /// A SQLite operation failed.
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "Store I/O error: {}", msg),
            StoreError::Serialization(msg) => write!(f, "Store serialization error: {}", msg),
            StoreError::Database(msg) => write!(f, "Store database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

// === SyncError ===

/// Errors surfaced by the reconciler and the sync endpoints.
#[derive(Debug)]
pub enum SyncError {
    /// The action tag is not one of `created`, `removed`, `changed`.
    InvalidAction(String),
    /// The bookmark payload does not fit the action.
    InvalidPayload(String),
    /// The mutation was applied in memory but could not be persisted.
    Persistence(StoreError),
}

impl SyncError {
    /// Whether the error is the caller's fault (a 400-class response).
    pub fn is_client_error(&self) -> bool {
        matches!(self, SyncError::InvalidAction(_) | SyncError::InvalidPayload(_))
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::InvalidAction(action) => write!(f, "Invalid action: {}", action),
            SyncError::InvalidPayload(msg) => write!(f, "Invalid bookmark payload: {}", msg),
            SyncError::Persistence(e) => write!(f, "Persistence failed: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        SyncError::Persistence(e)
    }
}

// === TransportError ===

/// Errors from a single delivery attempt to the sync server.
#[derive(Debug)]
pub enum TransportError {
    /// Connection, timeout or other transport-level failure.
    Network(String),
    /// The server answered with a non-success status.
    Status(u16, String),
    /// The payload could not be encoded.
    Serialization(String),
    /// The transport was built outside a tokio runtime and cannot spawn sends.
    NoRuntime,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "Transport network error: {}", msg),
            TransportError::Status(code, msg) => write!(f, "Server error {}: {}", code, msg),
            TransportError::Serialization(msg) => {
                write!(f, "Transport serialization error: {}", msg)
            }
            TransportError::NoRuntime => {
                write!(f, "No tokio runtime available for background sends")
            }
        }
    }
}

impl std::error::Error for TransportError {}

// === TreeError ===

/// Errors from the host bookmark tree.
#[derive(Debug)]
pub enum TreeError {
    /// The requested parent does not exist.
    ParentNotFound(String),
    /// The requested parent is a leaf.
    NotAFolder(String),
    /// A bookmarks file could not be read or parsed.
    Parse(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::ParentNotFound(id) => write!(f, "Parent node not found: {}", id),
            TreeError::NotAFolder(id) => write!(f, "Node is not a folder: {}", id),
            TreeError::Parse(msg) => write!(f, "Bookmark tree parse error: {}", msg),
        }
    }
}

impl std::error::Error for TreeError {}

// === ImportError ===

/// Errors from replaying a tree into a destination.
#[derive(Debug)]
pub enum ImportError {
    /// A node could not be created. The walk stopped there; the `created`
    /// nodes before it stay in the destination.
    Aborted { created: usize, source: TreeError },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Aborted { created, source } => write!(
                f,
                "Import aborted after {} created nodes: {}",
                created, source
            ),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Aborted { source, .. } => Some(source),
        }
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
