//! Event-sourced aggregate contract.

use crate::error::{DomainError, DomainResult};
use crate::event::{Event, RecordedEvent};
use crate::id::AggregateId;

/// Bookkeeping shared by every aggregate: identity, pending events,
/// tombstone flag and the count of applied events.
///
/// Concrete aggregates embed one of these and hand it out through
/// [`Aggregate::core`] / [`Aggregate::core_mut`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateCore {
    id: Option<AggregateId>,
    unsaved_events: Vec<RecordedEvent>,
    deleted: bool,
    version: u64,
}

impl AggregateCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&AggregateId> {
        self.id.as_ref()
    }

    /// Set the identity. Only the first assignment sticks.
    pub fn assign_id(&mut self, id: AggregateId) {
        match &self.id {
            None => self.id = Some(id),
            Some(current) if *current != id => {
                tracing::warn!(current = %current, ignored = %id, "aggregate id is already assigned");
            }
            Some(_) => {}
        }
    }

    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn unsaved_events(&self) -> &[RecordedEvent] {
        &self.unsaved_events
    }

    fn record(&mut self, event: RecordedEvent) {
        self.unsaved_events.push(event);
    }

    fn clear_unsaved_events(&mut self) {
        self.unsaved_events.clear();
    }

    fn take_oldest_unsaved(&mut self) -> Option<RecordedEvent> {
        if self.unsaved_events.is_empty() {
            None
        } else {
            Some(self.unsaved_events.remove(0))
        }
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }
}

/// Aggregate execution semantics.
///
/// - **Handlers**: `handle_event` is the per-type handler table, written as an
///   exhaustive `match` over `Self::Event`. It is the only place state changes.
/// - **Commands**: inherent methods on the aggregate validate against current
///   state and then call [`Aggregate::apply`]. A failed command must leave
///   state and the unsaved buffer untouched.
/// - **Replay**: [`Aggregate::initialize`] runs history through the same
///   handlers without buffering anything.
pub trait Aggregate {
    type Event: Event;

    fn core(&self) -> &AggregateCore;

    fn core_mut(&mut self) -> &mut AggregateCore;

    /// Mutate state for one event. The catch-all variant must be a no-op.
    fn handle_event(&mut self, event: &Self::Event);

    fn id(&self) -> Option<&AggregateId> {
        self.core().id()
    }

    /// Number of events applied so far (replayed and new).
    fn version(&self) -> u64 {
        self.core().version()
    }

    /// Dispatch an event to its handler.
    fn apply_event(&mut self, event: &Self::Event) {
        self.handle_event(event);
        self.core_mut().bump_version();
    }

    /// Apply a newly decided event and buffer it for persistence.
    ///
    /// The event is encoded first, so an invalid envelope fails with
    /// [`DomainError::InvalidEvent`] before any state changes.
    fn apply(&mut self, event: Self::Event) -> DomainResult<()> {
        let recorded = event.to_recorded()?;
        self.apply_event(&event);
        self.core_mut().record(recorded);
        Ok(())
    }

    /// Decode and apply a historical event. Nothing is buffered.
    fn apply_recorded(&mut self, recorded: &RecordedEvent) -> DomainResult<()> {
        let event = <Self::Event as Event>::from_recorded(recorded)?;
        self.apply_event(&event);
        Ok(())
    }

    /// Replay an ordered history.
    ///
    /// All events are decoded before the first one is applied, so a corrupt
    /// history leaves the aggregate untouched.
    fn initialize<'a, I>(&mut self, history: I) -> DomainResult<()>
    where
        I: IntoIterator<Item = &'a RecordedEvent>,
        Self: Sized,
    {
        let decoded = history
            .into_iter()
            .map(<Self::Event as Event>::from_recorded)
            .collect::<DomainResult<Vec<_>>>()?;
        for event in &decoded {
            self.apply_event(event);
        }
        Ok(())
    }

    fn unsaved_events(&self) -> &[RecordedEvent] {
        self.core().unsaved_events()
    }

    /// Discard every pending event without storing it.
    fn clear_unsaved_events(&mut self) {
        self.core_mut().clear_unsaved_events();
    }

    /// Drop the oldest unsaved event once it has been stored.
    ///
    /// The repository calls this per event, so a commit that fails halfway
    /// leaves exactly the unstored tail in the buffer.
    fn confirm_oldest_unsaved(&mut self) -> Option<RecordedEvent> {
        self.core_mut().take_oldest_unsaved()
    }

    fn mark_deleted(&mut self) {
        self.core_mut().mark_deleted();
    }

    fn is_deleted(&self) -> bool {
        self.core().is_deleted()
    }

    /// Fail with [`DomainError::EntityDeleted`] once the aggregate is
    /// tombstoned.
    fn ensure_active(&self) -> DomainResult<()> {
        if self.is_deleted() {
            let id = self
                .id()
                .cloned()
                .ok_or_else(|| DomainError::invariant("deleted aggregate has no id"))?;
            return Err(DomainError::deleted(id));
        }
        Ok(())
    }
}
