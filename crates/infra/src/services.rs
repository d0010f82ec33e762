//! In-memory wiring of the whole pipeline.
//!
//! Everything is constructed explicitly and owned by [`Services`]; there are
//! no process-wide singletons.

use std::sync::Arc;

use scrivener_core::{AggregateId, IdGenerator};
use scrivener_editor::Editor;
use scrivener_events::{InMemoryEventBus, ProjectionRunner, attach};

use crate::config::EditorConfig;
use crate::event_store::{EventStore, EventStoreError, InMemoryEventStore, StoredEvent};
use crate::gateway::CommandGateway;
use crate::projections::{EditorContentProjection, EditorListProjection};
use crate::repository::AggregateRepository;

pub type EditorRepository =
    AggregateRepository<Editor, Arc<InMemoryEventStore>, Arc<InMemoryEventBus>>;

/// Read models rebuilt by replaying the store.
#[derive(Debug)]
pub struct RebuiltProjections {
    pub list: EditorListProjection,
    pub content: EditorContentProjection,
}

#[derive(Debug)]
pub struct Services {
    pub store: Arc<InMemoryEventStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub editor_list: Arc<EditorListProjection>,
    pub editor_content: Arc<EditorContentProjection>,
    pub repository: Arc<EditorRepository>,
    pub gateway: CommandGateway<Arc<InMemoryEventStore>, Arc<InMemoryEventBus>>,
}

impl Services {
    pub fn new(config: &EditorConfig) -> Self {
        // store + bus, then projections attached before any event flows.
        let store = Arc::new(InMemoryEventStore::new());
        let bus = Arc::new(InMemoryEventBus::new());

        let editor_list = Arc::new(EditorListProjection::new());
        let editor_content = Arc::new(EditorContentProjection::new());
        attach(bus.as_ref(), editor_list.clone());
        attach(bus.as_ref(), editor_content.clone());

        let repository = Arc::new(
            AggregateRepository::new(Editor::empty, store.clone(), Some(bus.clone()))
                .with_deletion_policy(config.deletion_policy),
        );
        let gateway = CommandGateway::new(repository.clone(), IdGenerator::new(&config.id_prefix));

        tracing::debug!(
            id_prefix = %config.id_prefix,
            deletion_policy = ?config.deletion_policy,
            "services wired"
        );

        Self {
            store,
            bus,
            editor_list,
            editor_content,
            repository,
            gateway,
        }
    }

    /// Fresh read models built from the full stored history.
    ///
    /// The attached projections are left alone; callers compare or swap.
    pub fn rebuild_projections(&self) -> Result<RebuiltProjections, EventStoreError> {
        let all = self.store.load_all()?;
        let events = || all.iter().map(StoredEvent::recorded);

        Ok(RebuiltProjections {
            list: ProjectionRunner::rebuild_from_scratch(EditorListProjection::new, events()),
            content: ProjectionRunner::rebuild_from_scratch(EditorContentProjection::new, events()),
        })
    }

    /// Stored history of one editor.
    pub fn history(&self, id: &AggregateId) -> Result<Vec<StoredEvent>, EventStoreError> {
        self.store.load_events(id)
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}
