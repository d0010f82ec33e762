//! Editor list projection.
//!
//! Keeps one summary per live editor, ordered by file name.

use std::sync::RwLock;

use serde_json::Value as JsonValue;

use scrivener_core::AggregateId;
use scrivener_editor::{EditorCreated, EditorDeleted, EditorEvent};
use scrivener_events::Projection;

use super::decode;

/// Read model: one row of the editor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSummary {
    pub id: AggregateId,
    pub file_name: String,
}

/// Editors sorted by lower-cased file name. Equal names keep insertion order.
#[derive(Debug, Default)]
pub struct EditorListProjection {
    rows: RwLock<Vec<EditorSummary>>,
}

impl EditorListProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the list in display order.
    pub fn list(&self) -> Vec<EditorSummary> {
        self.rows.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn get(&self, id: &AggregateId) -> Option<EditorSummary> {
        self.rows
            .read()
            .ok()?
            .iter()
            .find(|row| row.id == *id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn on_created(&self, event: EditorCreated) {
        let Ok(mut rows) = self.rows.write() else {
            tracing::warn!("editor list lock poisoned; event skipped");
            return;
        };
        let key = event.file_name.to_lowercase();
        let at = rows.partition_point(|row| row.file_name.to_lowercase() <= key);
        rows.insert(
            at,
            EditorSummary {
                id: event.id,
                file_name: event.file_name,
            },
        );
    }

    fn on_deleted(&self, event: EditorDeleted) {
        let Ok(mut rows) = self.rows.write() else {
            tracing::warn!("editor list lock poisoned; event skipped");
            return;
        };
        rows.retain(|row| row.id != event.id);
    }
}

impl Projection for EditorListProjection {
    fn event_types(&self) -> &'static [&'static str] {
        &[EditorEvent::EDITOR_CREATED, EditorEvent::EDITOR_DELETED]
    }

    fn handle(&self, event_type: &str, payload: &JsonValue) {
        match event_type {
            EditorEvent::EDITOR_CREATED => {
                if let Some(event) = decode(event_type, payload) {
                    self.on_created(event);
                }
            }
            EditorEvent::EDITOR_DELETED => {
                if let Some(event) = decode(event_type, payload) {
                    self.on_deleted(event);
                }
            }
            _ => {}
        }
    }
}
