//! Sync Transport.
//!
//! Delivers one action or one snapshot to the sync server over HTTP. Each
//! call is exactly one attempt: no retry, no queue, no backoff. Callers log
//! and discard failures.

use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::types::errors::TransportError;
use crate::types::sync::{FullSnapshot, SyncAction, SyncEnvelope};

/// Receives translated actions for delivery without blocking the caller.
pub trait ActionSink {
    fn dispatch(&self, action: SyncAction);
}

/// HTTP client for the sync server's `/sync` and `/initial-upload` routes.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    runtime: Option<Handle>,
}

impl HttpTransport {
    /// Builds a transport for `base_url` (e.g. `http://localhost:6758`).
    ///
    /// Background sends go to the runtime current at construction, so
    /// `dispatch` works from threads outside it. Built with no runtime, the
    /// transport can still `send_*` but cannot dispatch.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            runtime: Handle::try_current().ok(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one action to `POST /sync`.
    pub async fn send_action(&self, action: &SyncAction) -> Result<(), TransportError> {
        let envelope = SyncEnvelope::from(action);
        debug!("Sending {} for {}", envelope.action, action.target_id());
        self.post("/sync", &envelope).await
    }

    /// Starts `send_action` as a task on the captured runtime.
    pub fn spawn_action(
        &self,
        action: SyncAction,
    ) -> Result<JoinHandle<Result<(), TransportError>>, TransportError> {
        let runtime = self.runtime.as_ref().ok_or(TransportError::NoRuntime)?;
        let transport = self.clone();
        Ok(runtime.spawn(async move { transport.send_action(&action).await }))
    }

    /// Sends the full snapshot to `POST /initial-upload`.
    pub async fn send_snapshot(&self, snapshot: &FullSnapshot) -> Result<(), TransportError> {
        debug!("Uploading snapshot with {} root records", snapshot.bookmarks.len());
        self.post("/initial-upload", snapshot).await
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), TransportError> {
        let body = serde_json::to_vec(body).map_err(|e| TransportError::Serialization(e.to_string()))?;
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let reason = status.canonical_reason().unwrap_or("unknown status").to_string();
        Err(TransportError::Status(status.as_u16(), reason))
    }
}

impl ActionSink for HttpTransport {
    /// Spawns the send and returns immediately. The outcome is logged;
    /// nothing is reported back.
    fn dispatch(&self, action: SyncAction) {
        let id = action.target_id().to_string();
        let Some(runtime) = self.runtime.clone() else {
            warn!("Dropped sync of bookmark {}: {}", id, TransportError::NoRuntime);
            return;
        };
        let transport = self.clone();
        runtime.spawn(async move {
            if let Err(e) = transport.send_action(&action).await {
                warn!("Failed to sync bookmark {}: {}", id, e);
            }
        });
    }
}
