//! Change Event Translator.
//!
//! Turns each host mutation notification into exactly one [`SyncAction`]
//! and hands it to an [`ActionSink`]. One notification, one action, one
//! dispatch; nothing is batched and nothing flows back to the host.

use tracing::debug;

use crate::services::sync_transport::ActionSink;
use crate::types::bookmark::BookmarkRecord;
use crate::types::sync::{MutationEvent, SyncAction};

/// Maps a notification to its action.
///
/// `Removed` carries only the id; `Changed` carries only the changed fields.
/// For `Created` the notification id wins over the node's own id.
pub fn translate(event: &MutationEvent) -> SyncAction {
    match event {
        MutationEvent::Created { id, node } => {
            let mut record = BookmarkRecord::from_node(node);
            record.id = id.clone();
            SyncAction::Created(record)
        }
        MutationEvent::Removed { id, .. } => SyncAction::Removed(id.clone()),
        MutationEvent::Changed { id, change_info } => {
            let mut fields = change_info.clone();
            fields.remove("id");
            SyncAction::Changed(id.clone(), fields)
        }
    }
}

/// Forwards host notifications to a sink, in arrival order.
pub struct ChangeEventTranslator<S: ActionSink> {
    sink: S,
}

impl<S: ActionSink> ChangeEventTranslator<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn handle(&self, event: MutationEvent) {
        let action = translate(&event);
        debug!("Translated {} for {}", action.kind(), action.target_id());
        self.sink.dispatch(action);
    }
}
