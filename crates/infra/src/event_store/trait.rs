use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use scrivener_core::{AggregateId, RecordedEvent};
use std::sync::Arc;

/// A stored event in an append-only stream.
///
/// ## Ordering
///
/// - `sequence_number` is the 1-based position inside the aggregate's stream;
///   insertion order is the only order and is never rewritten.
/// - `position` is monotonic across the whole store and orders events from
///   different streams for full replays.
///
/// `event_id` and `recorded_at` are bookkeeping; replay only looks at the
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub aggregate_id: AggregateId,

    /// Position in the aggregate stream, starting at 1.
    pub sequence_number: u64,

    /// Store-wide position, starting at 1.
    pub position: u64,

    pub recorded_at: DateTime<Utc>,

    pub event: RecordedEvent,
}

impl StoredEvent {
    pub fn event_type(&self) -> &str {
        self.event.event_type()
    }

    pub fn recorded(&self) -> &RecordedEvent {
        &self.event
    }
}

/// Event store operation error.
///
/// The in-memory store has a single failure mode; the enum leaves room for
/// others without changing callers.
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("event store lock poisoned")]
    Poisoned,
}

/// Append-only event log keyed by aggregate identifier.
///
/// ## Semantics
///
/// - `store_event` appends to the identifier's stream, creating it if absent
/// - `load_events` returns the full stream in order, empty when unknown
/// - `exists` is true iff the stream is non-empty
/// - `delete_events` drops the stream entirely, which frees the identifier for
///   reuse
/// - `load_all` returns every stream interleaved in store-wide order
///
/// The store does no validation of its own: identity checks belong to the
/// repository, envelope checks to [`RecordedEvent`].
pub trait EventStore: Send + Sync {
    fn store_event(
        &self,
        aggregate_id: &AggregateId,
        event: &RecordedEvent,
    ) -> Result<StoredEvent, EventStoreError>;

    fn load_events(&self, aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>, EventStoreError>;

    fn exists(&self, aggregate_id: &AggregateId) -> Result<bool, EventStoreError>;

    fn delete_events(&self, aggregate_id: &AggregateId) -> Result<(), EventStoreError>;

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError>;
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn store_event(
        &self,
        aggregate_id: &AggregateId,
        event: &RecordedEvent,
    ) -> Result<StoredEvent, EventStoreError> {
        (**self).store_event(aggregate_id, event)
    }

    fn load_events(&self, aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_events(aggregate_id)
    }

    fn exists(&self, aggregate_id: &AggregateId) -> Result<bool, EventStoreError> {
        (**self).exists(aggregate_id)
    }

    fn delete_events(&self, aggregate_id: &AggregateId) -> Result<(), EventStoreError> {
        (**self).delete_events(aggregate_id)
    }

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_all()
    }
}
