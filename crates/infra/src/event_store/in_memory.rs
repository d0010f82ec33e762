use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use scrivener_core::{AggregateId, RecordedEvent};

use super::r#trait::{EventStore, EventStoreError, StoredEvent};

#[derive(Debug, Default)]
struct Streams {
    by_id: HashMap<AggregateId, Vec<StoredEvent>>,
    next_position: u64,
}

/// In-memory append-only event store.
///
/// Lives as long as its owner; nothing is written to disk.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<Streams>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for InMemoryEventStore {
    fn store_event(
        &self,
        aggregate_id: &AggregateId,
        event: &RecordedEvent,
    ) -> Result<StoredEvent, EventStoreError> {
        let mut streams = self.streams.write().map_err(|_| EventStoreError::Poisoned)?;

        streams.next_position += 1;
        let position = streams.next_position;

        let stream = streams.by_id.entry(aggregate_id.clone()).or_default();
        let stored = StoredEvent {
            event_id: Uuid::now_v7(),
            aggregate_id: aggregate_id.clone(),
            sequence_number: stream.len() as u64 + 1,
            position,
            recorded_at: Utc::now(),
            event: event.clone(),
        };
        stream.push(stored.clone());

        tracing::trace!(
            aggregate_id = %aggregate_id,
            event_type = event.event_type(),
            sequence_number = stored.sequence_number,
            "event stored"
        );
        Ok(stored)
    }

    fn load_events(&self, aggregate_id: &AggregateId) -> Result<Vec<StoredEvent>, EventStoreError> {
        let streams = self.streams.read().map_err(|_| EventStoreError::Poisoned)?;
        Ok(streams.by_id.get(aggregate_id).cloned().unwrap_or_default())
    }

    fn exists(&self, aggregate_id: &AggregateId) -> Result<bool, EventStoreError> {
        let streams = self.streams.read().map_err(|_| EventStoreError::Poisoned)?;
        Ok(streams
            .by_id
            .get(aggregate_id)
            .is_some_and(|stream| !stream.is_empty()))
    }

    fn delete_events(&self, aggregate_id: &AggregateId) -> Result<(), EventStoreError> {
        let mut streams = self.streams.write().map_err(|_| EventStoreError::Poisoned)?;
        if let Some(removed) = streams.by_id.remove(aggregate_id) {
            tracing::debug!(aggregate_id = %aggregate_id, events = removed.len(), "stream deleted");
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError> {
        let streams = self.streams.read().map_err(|_| EventStoreError::Poisoned)?;
        let mut all: Vec<StoredEvent> = streams.by_id.values().flatten().cloned().collect();
        all.sort_by_key(|e| e.position);
        Ok(all)
    }
}
