//! Editor content projection.
//!
//! Mirrors the text of every live editor so reads never touch the event
//! store. The view applies events blindly; offsets that do not fit the
//! current text are logged and skipped.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use scrivener_core::AggregateId;
use scrivener_editor::{EditorCreated, EditorDeleted, EditorEvent, TextAppended, TextDeleted};
use scrivener_events::Projection;

use super::decode;

/// Read model: the current text of one editor.
///
/// `length` is maintained incrementally and always equals `content.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContent {
    pub id: AggregateId,
    pub file_name: String,
    pub content: String,
    pub length: usize,
}

#[derive(Debug, Default)]
pub struct EditorContentProjection {
    documents: RwLock<HashMap<AggregateId, EditorContent>>,
}

impl EditorContentProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &AggregateId) -> Option<EditorContent> {
        self.documents.read().ok()?.get(id).cloned()
    }

    /// All documents, ordered by id.
    pub fn list(&self) -> Vec<EditorContent> {
        let mut all: Vec<EditorContent> = self
            .documents
            .read()
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    fn update(&self, id: &AggregateId, f: impl FnOnce(&mut EditorContent)) {
        let Ok(mut docs) = self.documents.write() else {
            tracing::warn!(aggregate_id = %id, "content view lock poisoned; event skipped");
            return;
        };
        match docs.get_mut(id) {
            Some(doc) => f(doc),
            None => tracing::warn!(aggregate_id = %id, "no content view for editor; event skipped"),
        }
    }

    fn on_created(&self, event: EditorCreated) {
        let Ok(mut docs) = self.documents.write() else {
            tracing::warn!(aggregate_id = %event.id, "content view lock poisoned; event skipped");
            return;
        };
        docs.insert(
            event.id.clone(),
            EditorContent {
                id: event.id,
                file_name: event.file_name,
                content: String::new(),
                length: 0,
            },
        );
    }

    fn on_appended(&self, event: TextAppended) {
        self.update(&event.id, |doc| {
            let at = event.position.unwrap_or(doc.length);
            if at > doc.length || !doc.content.is_char_boundary(at) {
                tracing::warn!(
                    aggregate_id = %doc.id,
                    position = at,
                    length = doc.length,
                    "insert position does not fit content; event skipped"
                );
                return;
            }
            doc.content.insert_str(at, &event.text);
            doc.length += event.text.len();
        });
    }

    fn on_text_deleted(&self, event: TextDeleted) {
        self.update(&event.id, |doc| {
            let fits = event
                .position
                .checked_add(event.length)
                .filter(|&end| end <= doc.length)
                .filter(|&end| {
                    doc.content.is_char_boundary(event.position)
                        && doc.content.is_char_boundary(end)
                });
            let Some(end) = fits else {
                tracing::warn!(
                    aggregate_id = %doc.id,
                    position = event.position,
                    delete_length = event.length,
                    length = doc.length,
                    "delete range does not fit content; event skipped"
                );
                return;
            };
            doc.content.replace_range(event.position..end, "");
            doc.length -= event.length;
        });
    }

    fn on_deleted(&self, event: EditorDeleted) {
        if let Ok(mut docs) = self.documents.write() {
            docs.remove(&event.id);
        }
    }
}

impl Projection for EditorContentProjection {
    fn event_types(&self) -> &'static [&'static str] {
        &[
            EditorEvent::EDITOR_CREATED,
            EditorEvent::TEXT_APPENDED,
            EditorEvent::TEXT_DELETED,
            EditorEvent::EDITOR_DELETED,
        ]
    }

    fn handle(&self, event_type: &str, payload: &JsonValue) {
        match event_type {
            EditorEvent::EDITOR_CREATED => {
                if let Some(event) = decode(event_type, payload) {
                    self.on_created(event);
                }
            }
            EditorEvent::TEXT_APPENDED => {
                if let Some(event) = decode(event_type, payload) {
                    self.on_appended(event);
                }
            }
            EditorEvent::TEXT_DELETED => {
                if let Some(event) = decode(event_type, payload) {
                    self.on_text_deleted(event);
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
