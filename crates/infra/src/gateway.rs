//! Command gateway (application-level orchestration).
//!
//! ## Command Execution Flow
//!
//! ```text
//! EditorCommand
//!   ↓
//! 1. Load the editor's history (unknown id → UnknownEntity)
//!   ↓
//! 2. Rehydrate the aggregate
//!   ↓
//! 3. Run the command (validation, produces events)
//!   ↓
//! 4. Save: persist then publish each event
//! ```
//!
//! A command that fails in step 3 never reaches the repository, so nothing
//! is stored or published.

use std::sync::Arc;

use scrivener_core::{AggregateId, IdGenerator};
use scrivener_editor::{Editor, EditorCommand};
use scrivener_events::EventBus;

use crate::event_store::EventStore;
use crate::repository::{AggregateRepository, RepositoryError};

pub struct CommandGateway<S, B> {
    repository: Arc<AggregateRepository<Editor, S, B>>,
    ids: IdGenerator,
}

impl<S, B> CommandGateway<S, B>
where
    S: EventStore,
    B: EventBus,
{
    pub fn new(repository: Arc<AggregateRepository<Editor, S, B>>, ids: IdGenerator) -> Self {
        Self { repository, ids }
    }

    pub fn repository(&self) -> &AggregateRepository<Editor, S, B> {
        &self.repository
    }

    /// Create a new editor under a freshly generated id.
    pub fn create(&self, file_name: &str) -> Result<AggregateId, RepositoryError> {
        let id = self.ids.next_id();
        let mut editor = Editor::create(id.clone(), file_name)?;
        self.repository.add(&mut editor)?;
        tracing::info!(aggregate_id = %id, file_name, "editor created");
        Ok(id)
    }

    /// Run one command against an existing editor.
    pub fn execute(&self, id: &AggregateId, command: &EditorCommand) -> Result<(), RepositoryError> {
        let mut editor = self.repository.load_existing(id)?;
        editor.execute(command)?;
        self.repository.save(&mut editor)?;

        match command {
            EditorCommand::Delete => tracing::info!(aggregate_id = %id, "editor deleted"),
            _ => tracing::debug!(aggregate_id = %id, command = command.name(), "command executed"),
        }
        Ok(())
    }
}

impl<S, B> std::fmt::Debug for CommandGateway<S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGateway")
            .field("id_prefix", &self.ids.prefix())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use scrivener_core::{Aggregate, DomainError};
    use scrivener_events::InMemoryEventBus;

    use super::*;
    use crate::event_store::InMemoryEventStore;

    fn gateway() -> CommandGateway<Arc<InMemoryEventStore>, Arc<InMemoryEventBus>> {
        let store = Arc::new(InMemoryEventStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let repository = Arc::new(AggregateRepository::new(Editor::empty, store, Some(bus)));
        CommandGateway::new(repository, IdGenerator::new("E"))
    }

    fn append(text: &str) -> EditorCommand {
        EditorCommand::AppendText {
            text: text.into(),
            position: None,
        }
    }

    #[test]
    fn create_generates_sequential_ids() {
        let gateway = gateway();
        let first = gateway.create("a.txt").unwrap();
        let second = gateway.create("b.txt").unwrap();
        assert_eq!(first.as_str(), "E1");
        assert_eq!(second.as_str(), "E2");
        assert_eq!(gateway.repository().load(&second).unwrap().file_name(), "b.txt");
    }

    #[test]
    fn blank_file_names_are_rejected() {
        let gateway = gateway();
        let err = gateway.create("  ").unwrap_err();
        assert!(matches!(err, RepositoryError::Domain(DomainError::Validation(_))));
    }

    #[test]
    fn execute_loads_runs_and_saves() {
        let gateway = gateway();
        let id = gateway.create("a.txt").unwrap();
        gateway.execute(&id, &append("Hello")).unwrap();
        gateway
            .execute(
                &id,
                &EditorCommand::AppendText {
                    text: "X".into(),
                    position: Some(0),
                },
            )
            .unwrap();

        let editor = gateway.repository().load(&id).unwrap();
        assert_eq!(editor.content(), "XHello");
        assert_eq!(editor.version(), 3);
    }

    #[test]
    fn failed_commands_persist_nothing() {
        let gateway = gateway();
        let id = gateway.create("a.txt").unwrap();
        gateway.execute(&id, &append("abc")).unwrap();

        let err = gateway
            .execute(
                &id,
                &EditorCommand::DeleteText {
                    position: 2,
                    length: 5,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Domain(DomainError::InvariantViolation(_))
        ));
        assert_eq!(
            gateway.repository().store().load_events(&id).unwrap().len(),
            2
        );
    }

    #[test]
    fn unknown_ids_are_reported() {
        let gateway = gateway();
        let missing = AggregateId::new("E42").unwrap();
        assert!(matches!(
            gateway.execute(&missing, &append("x")),
            Err(RepositoryError::UnknownEntity(id)) if id == missing
        ));
    }
}
