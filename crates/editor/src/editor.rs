use scrivener_core::{Aggregate, AggregateCore, AggregateId, DomainError, DomainResult};

use crate::events::{EditorCreated, EditorDeleted, EditorEvent, TextAppended, TextDeleted};

/// Aggregate root: Editor, one text document.
///
/// Offsets are byte offsets into the UTF-8 content and must fall on character
/// boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    core: AggregateCore,
    file_name: String,
    content: String,
    content_length: usize,
}

impl Editor {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Command: create a new editor for `file_name`.
    pub fn create(id: AggregateId, file_name: impl Into<String>) -> DomainResult<Self> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(DomainError::validation("file name cannot be empty"));
        }

        let mut editor = Self::empty();
        editor.apply(EditorEvent::EditorCreated(EditorCreated { id, file_name }))?;
        Ok(editor)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Command: insert `text` at `position`, or at the end when `None`.
    pub fn append_text(&mut self, text: &str, position: Option<i64>) -> DomainResult<()> {
        let id = self.ensure_editable()?;
        if text.is_empty() {
            return Err(DomainError::validation("text cannot be empty"));
        }
        let position = position
            .map(|p| self.checked_offset(p, "position"))
            .transpose()?;

        self.apply(EditorEvent::TextAppended(TextAppended {
            id,
            text: text.to_string(),
            position,
        }))
    }

    /// Command: remove `length` bytes starting at `position`.
    pub fn delete_text(&mut self, position: i64, length: i64) -> DomainResult<()> {
        let id = self.ensure_editable()?;
        if length <= 0 {
            return Err(DomainError::validation(format!(
                "length must be positive (got {length})"
            )));
        }
        let start = self.checked_offset(position, "position")?;
        let end = position
            .checked_add(length)
            .ok_or_else(|| DomainError::invariant("range end overflows"))?;
        let end = self.checked_offset(end, "range end")?;

        self.apply(EditorEvent::TextDeleted(TextDeleted {
            id,
            position: start,
            length: end - start,
        }))
    }

    /// Command: tombstone the editor.
    pub fn delete(&mut self) -> DomainResult<()> {
        let id = self.ensure_editable()?;
        self.apply(EditorEvent::EditorDeleted(EditorDeleted { id }))
    }

    fn ensure_editable(&self) -> DomainResult<AggregateId> {
        self.ensure_active()?;
        self.id()
            .cloned()
            .ok_or_else(|| DomainError::invariant("editor has not been created"))
    }

    /// Validate a signed offset against the current content.
    fn checked_offset(&self, offset: i64, what: &str) -> DomainResult<usize> {
        let len = self.content_length;
        let offset = usize::try_from(offset)
            .map_err(|_| DomainError::invariant(format!("{what} {offset} is negative")))?;
        if offset > len {
            return Err(DomainError::invariant(format!(
                "{what} {offset} is beyond content length {len}"
            )));
        }
        if !self.content.is_char_boundary(offset) {
            return Err(DomainError::invariant(format!(
                "{what} {offset} is not on a character boundary"
            )));
        }
        Ok(offset)
    }
}

impl Aggregate for Editor {
    type Event = EditorEvent;

    fn core(&self) -> &AggregateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AggregateCore {
        &mut self.core
    }

    fn handle_event(&mut self, event: &EditorEvent) {
        match event {
            EditorEvent::EditorCreated(e) => {
                self.core.assign_id(e.id.clone());
                self.file_name = e.file_name.clone();
                self.content.clear();
                self.content_length = 0;
            }
            EditorEvent::TextAppended(e) => {
                let at = e.position.unwrap_or(self.content.len());
                if !self.content.is_char_boundary(at) {
                    tracing::warn!(id = %e.id, position = at, "ignoring append at invalid offset");
                    return;
                }
                self.content.insert_str(at, &e.text);
                self.content_length += e.text.len();
            }
            EditorEvent::TextDeleted(e) => {
                let Some(end) = e.position.checked_add(e.length) else {
                    tracing::warn!(id = %e.id, "ignoring delete with overflowing range");
                    return;
                };
                if self.content.get(e.position..end).is_none() {
                    tracing::warn!(id = %e.id, position = e.position, length = e.length, "ignoring delete of invalid range");
                    return;
                }
                self.content.replace_range(e.position..end, "");
                self.content_length -= e.length;
            }
            EditorEvent::EditorDeleted(_) => {
                self.core.mark_deleted();
            }
            EditorEvent::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use scrivener_core::RecordedEvent;
    use serde_json::json;

    use super::*;

    fn id(s: &str) -> AggregateId {
        AggregateId::new(s).unwrap()
    }

    fn editor_with(content: &str) -> Editor {
        let mut editor = Editor::create(id("E1"), "a.txt").unwrap();
        if !content.is_empty() {
            editor.append_text(content, None).unwrap();
        }
        editor
    }

    #[test]
    fn create_emits_editor_created() {
        let editor = Editor::create(id("ID"), "one.txt").unwrap();

        assert_eq!(editor.id(), Some(&id("ID")));
        assert_eq!(editor.file_name(), "one.txt");
        assert_eq!(editor.content(), "");
        assert_eq!(
            editor.unsaved_events(),
            &[RecordedEvent::new("EditorCreated", json!({"id": "ID", "file_name": "one.txt"})).unwrap()]
        );
    }

    #[test]
    fn editors_keep_their_own_ids() {
        let e1 = Editor::create(id("ID"), "one.txt").unwrap();
        let e2 = Editor::create(id("e2"), "two.txt").unwrap();
        assert_eq!(e1.id(), Some(&id("ID")));
        assert_eq!(e2.id(), Some(&id("e2")));
    }

    #[test]
    fn create_rejects_blank_file_name() {
        let err = Editor::create(id("E1"), "  ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn append_goes_to_end_or_offset() {
        let mut editor = editor_with("Hello");
        editor.append_text("X", Some(0)).unwrap();
        assert_eq!(editor.content(), "XHello");
        assert_eq!(editor.content_length(), 6);

        editor.append_text("!", Some(6)).unwrap();
        assert_eq!(editor.content(), "XHello!");
    }

    #[test]
    fn append_beyond_length_fails_without_events() {
        let mut editor = editor_with("abc");
        let before = editor.clone();

        let err = editor.append_text("x", Some(4)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(editor, before);
    }

    #[test]
    fn append_rejects_negative_position_and_empty_text() {
        let mut editor = editor_with("abc");
        assert!(editor.append_text("x", Some(-1)).is_err());
        assert!(matches!(
            editor.append_text("", None),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(editor.unsaved_events().len(), 2);
    }

    #[test]
    fn delete_removes_a_bounded_range() {
        let mut editor = editor_with("0123456789");
        editor.delete_text(5, 3).unwrap();
        assert_eq!(editor.content(), "0123489");
        assert_eq!(editor.content_length(), 7);
    }

    #[test]
    fn delete_rejects_bad_ranges() {
        let mut editor = editor_with("0123456789");
        let before = editor.clone();

        for (position, length) in [(0, 0), (0, -2), (-1, 2), (8, 3), (11, 1), (i64::MAX, 1)] {
            assert!(
                editor.delete_text(position, length).is_err(),
                "delete({position}, {length}) should fail"
            );
        }
        assert_eq!(editor, before);
    }

    #[test]
    fn offsets_must_respect_character_boundaries() {
        let mut editor = editor_with("héllo");
        assert!(editor.append_text("x", Some(2)).is_err());
        assert!(editor.delete_text(1, 1).is_err());

        editor.delete_text(1, 2).unwrap();
        assert_eq!(editor.content(), "hllo");
        assert_eq!(editor.content_length(), 4);
    }

    #[test]
    fn commands_require_a_created_editor() {
        let mut editor = Editor::empty();
        assert!(matches!(
            editor.append_text("x", None),
            Err(DomainError::InvariantViolation(_))
        ));
        assert!(editor.delete().is_err());
        assert!(editor.unsaved_events().is_empty());
    }

    #[test]
    fn deleted_editor_rejects_every_command() {
        let mut editor = editor_with("abc");
        editor.delete().unwrap();
        assert!(editor.is_deleted());

        let before = editor.clone();
        let deleted = DomainError::EntityDeleted(id("E1"));
        assert_eq!(editor.append_text("x", None), Err(deleted.clone()));
        assert_eq!(editor.delete_text(0, 1), Err(deleted.clone()));
        assert_eq!(editor.delete(), Err(deleted));
        assert_eq!(editor, before);
    }

    #[test]
    fn replay_rebuilds_the_same_state() {
        let mut editor = editor_with("Hello");
        editor.append_text("X", Some(0)).unwrap();
        editor.delete_text(1, 2).unwrap();

        let mut replayed = Editor::empty();
        replayed.initialize(editor.unsaved_events()).unwrap();

        assert_eq!(replayed.id(), editor.id());
        assert_eq!(replayed.content(), "Xllo");
        assert_eq!(replayed.content(), editor.content());
        assert_eq!(replayed.content_length(), editor.content_length());
        assert_eq!(replayed.version(), editor.version());
        assert!(replayed.unsaved_events().is_empty());
    }

    #[test]
    fn replay_skips_corrupt_offsets() {
        let history = vec![
            RecordedEvent::new("EditorCreated", json!({"id": "E1", "file_name": "a"})).unwrap(),
            RecordedEvent::new("TextAppended", json!({"id": "E1", "text": "ab"})).unwrap(),
            RecordedEvent::new("TextAppended", json!({"id": "E1", "text": "z", "position": 9})).unwrap(),
            RecordedEvent::new("TextDeleted", json!({"id": "E1", "position": 1, "length": 5})).unwrap(),
        ];
        let mut editor = Editor::empty();
        editor.initialize(&history).unwrap();
        assert_eq!(editor.content(), "ab");
        assert_eq!(editor.content_length(), 2);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Append(String, Option<i64>),
            Delete(i64, i64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                ("[a-zé]{0,6}", proptest::option::of(-2i64..20)).prop_map(|(t, p)| Op::Append(t, p)),
                (-2i64..20, -2i64..8).prop_map(|(p, l)| Op::Delete(p, l)),
            ]
        }

        fn run(editor: &mut Editor, op: &Op) -> DomainResult<()> {
            match op {
                Op::Append(text, position) => editor.append_text(text, *position),
                Op::Delete(position, length) => editor.delete_text(*position, *length),
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: replaying the produced events on two fresh instances
            /// gives identical state, equal to the live aggregate's.
            #[test]
            fn replay_is_deterministic(ops in proptest::collection::vec(op(), 0..30)) {
                let mut editor = Editor::create(id("P1"), "p.txt").unwrap();
                for op in &ops {
                    let _ = run(&mut editor, op);
                }

                let mut a = Editor::empty();
                let mut b = Editor::empty();
                a.initialize(editor.unsaved_events()).unwrap();
                b.initialize(editor.unsaved_events()).unwrap();

                prop_assert_eq!(&a, &b);
                prop_assert_eq!(a.content(), editor.content());
                prop_assert_eq!(a.content_length(), editor.content_length());
            }

            /// Property: a failed command leaves state and buffer unchanged,
            /// and the length counter always matches the content.
            #[test]
            fn failed_commands_are_all_or_nothing(ops in proptest::collection::vec(op(), 0..30)) {
                let mut editor = Editor::create(id("P2"), "p.txt").unwrap();
                for op in &ops {
                    let before = editor.clone();
                    if run(&mut editor, op).is_err() {
                        prop_assert_eq!(&editor, &before);
                    }
                    prop_assert_eq!(editor.content_length(), editor.content().len());
                }
            }
        }
    }
}
