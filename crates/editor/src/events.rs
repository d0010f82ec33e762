use serde::{Deserialize, Serialize};

use scrivener_core::{AggregateId, Event};

/// Event: EditorCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorCreated {
    pub id: AggregateId,
    pub file_name: String,
}

/// Event: TextAppended. Without a position the text goes at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAppended {
    pub id: AggregateId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

/// Event: TextDeleted. Offsets are in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDeleted {
    pub id: AggregateId,
    pub position: usize,
    pub length: usize,
}

/// Event: EditorDeleted (tombstone).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorDeleted {
    pub id: AggregateId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EditorEvent {
    EditorCreated(EditorCreated),
    TextAppended(TextAppended),
    TextDeleted(TextDeleted),
    EditorDeleted(EditorDeleted),
    /// Any type this version of the editor does not know.
    #[serde(other)]
    Unknown,
}

impl EditorEvent {
    pub const EDITOR_CREATED: &'static str = "EditorCreated";
    pub const TEXT_APPENDED: &'static str = "TextAppended";
    pub const TEXT_DELETED: &'static str = "TextDeleted";
    pub const EDITOR_DELETED: &'static str = "EditorDeleted";
}

impl Event for EditorEvent {
    const TYPES: &'static [&'static str] = &[
        Self::EDITOR_CREATED,
        Self::TEXT_APPENDED,
        Self::TEXT_DELETED,
        Self::EDITOR_DELETED,
    ];

    fn event_type(&self) -> &'static str {
        match self {
            EditorEvent::EditorCreated(_) => Self::EDITOR_CREATED,
            EditorEvent::TextAppended(_) => Self::TEXT_APPENDED,
            EditorEvent::TextDeleted(_) => Self::TEXT_DELETED,
            EditorEvent::EditorDeleted(_) => Self::EDITOR_DELETED,
            EditorEvent::Unknown => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use scrivener_core::RecordedEvent;
    use serde_json::json;

    use super::*;

    #[test]
    fn append_without_position_omits_the_field() {
        let event = EditorEvent::TextAppended(TextAppended {
            id: AggregateId::new("E1").unwrap(),
            text: "Hello".into(),
            position: None,
        });
        let recorded = event.to_recorded().unwrap();
        assert_eq!(recorded.event_type(), "TextAppended");
        assert_eq!(recorded.payload(), &json!({"id": "E1", "text": "Hello"}));
    }

    #[test]
    fn stored_payloads_decode_back() {
        let recorded =
            RecordedEvent::new("TextDeleted", json!({"id": "E4", "position": 5, "length": 3}))
                .unwrap();
        assert_eq!(
            EditorEvent::from_recorded(&recorded).unwrap(),
            EditorEvent::TextDeleted(TextDeleted {
                id: AggregateId::new("E4").unwrap(),
                position: 5,
                length: 3,
            })
        );
    }

    #[test]
    fn future_types_decode_as_unknown() {
        let recorded = RecordedEvent::new("EditorRenamed", json!({"id": "E1"})).unwrap();
        assert_eq!(EditorEvent::from_recorded(&recorded).unwrap(), EditorEvent::Unknown);
    }
}
