//! HTTP routes of the sync server.
//!
//! `POST /sync` applies one action, `POST /initial-upload` replaces the
//! collection, `GET /bookmarks` returns it. Reconciler calls run on the
//! blocking pool since they share a lock with store writes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::managers::reconciler::Reconciler;
use crate::services::durable_store::DurableStore;
use crate::types::errors::SyncError;
use crate::types::sync::{FullSnapshot, SyncAction, SyncEnvelope};

pub const SYNCED_MESSAGE: &str = "Bookmark synced successfully";
pub const UPLOADED_MESSAGE: &str = "Initial bookmarks uploaded successfully";
pub const INVALID_ACTION_MESSAGE: &str = "Invalid action";

/// Body of every `POST` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

type Reply = (StatusCode, Json<MessageResponse>);

fn reply(status: StatusCode, message: impl Into<String>) -> Reply {
    (
        status,
        Json(MessageResponse {
            message: message.into(),
        }),
    )
}

fn sync_error_reply(err: SyncError) -> Reply {
    match err {
        SyncError::InvalidAction(action) => {
            warn!("Rejected unknown action '{}'", action);
            reply(StatusCode::BAD_REQUEST, INVALID_ACTION_MESSAGE)
        }
        err if err.is_client_error() => {
            warn!("Rejected sync request: {}", err);
            reply(StatusCode::BAD_REQUEST, err.to_string())
        }
        err => reply(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn rejection_reply(rejection: JsonRejection) -> Reply {
    debug!("Rejected request body: {}", rejection.body_text());
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    reply(status, rejection.body_text())
}

/// Runs a reconciler call off the async workers.
async fn run_blocking<S, T, F>(reconciler: &Arc<Reconciler<S>>, f: F) -> Result<T, Reply>
where
    S: DurableStore + 'static,
    T: Send + 'static,
    F: FnOnce(&Reconciler<S>) -> Result<T, SyncError> + Send + 'static,
{
    let reconciler = Arc::clone(reconciler);
    match tokio::task::spawn_blocking(move || f(&reconciler)).await {
        Ok(result) => result.map_err(sync_error_reply),
        Err(e) => {
            error!("Reconciler task failed: {}", e);
            Err(reply(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

async fn sync_bookmark<S: DurableStore + 'static>(
    State(reconciler): State<Arc<Reconciler<S>>>,
    payload: Result<Json<SyncEnvelope>, JsonRejection>,
) -> Reply {
    let Json(envelope) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_reply(rejection),
    };

    let action = match SyncAction::try_from(envelope) {
        Ok(action) => action,
        Err(e) => return sync_error_reply(e),
    };
    let kind = action.kind();
    let id = action.target_id().to_string();

    match run_blocking(&reconciler, move |r| r.apply(action)).await {
        Ok(outcome) => {
            info!("Applied {} for {}: {:?}", kind, id, outcome);
            reply(StatusCode::OK, SYNCED_MESSAGE)
        }
        Err(response) => response,
    }
}

async fn initial_upload<S: DurableStore + 'static>(
    State(reconciler): State<Arc<Reconciler<S>>>,
    payload: Result<Json<FullSnapshot>, JsonRejection>,
) -> Reply {
    let Json(snapshot) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_reply(rejection),
    };

    let count = snapshot.bookmarks.len();
    match run_blocking(&reconciler, move |r| r.replace_all(snapshot.bookmarks)).await {
        Ok(()) => {
            info!("Replaced collection with {} uploaded records", count);
            reply(StatusCode::OK, UPLOADED_MESSAGE)
        }
        Err(response) => response,
    }
}

async fn list_bookmarks<S: DurableStore + 'static>(
    State(reconciler): State<Arc<Reconciler<S>>>,
) -> Result<Json<FullSnapshot>, Reply> {
    let bookmarks = run_blocking(&reconciler, |r| Ok(r.records())).await?;
    Ok(Json(FullSnapshot { bookmarks }))
}

/// Build the sync router over a shared reconciler.
///
/// CORS is permissive so the extension's background page can call it from
/// any origin.
pub fn build_router<S: DurableStore + 'static>(
    reconciler: Arc<Reconciler<S>>,
    body_limit_bytes: usize,
) -> Router {
    Router::new()
        .route("/sync", post(sync_bookmark::<S>))
        .route("/initial-upload", post(initial_upload::<S>))
        .route("/bookmarks", get(list_bookmarks::<S>))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(CorsLayer::permissive())
        .with_state(reconciler)
}
