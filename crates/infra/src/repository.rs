//! Aggregate repository: creation, loading and saving against a store and bus.
//!
//! ## Commit protocol
//!
//! `add` and `save` share one commit path:
//!
//! ```text
//! identity checks (no writes yet)
//!   ↓
//! for each unsaved event, oldest first:
//!     1. store the event
//!     2. drop it from the aggregate's unsaved buffer
//!     3. publish it to the bus (if configured)
//!   ↓
//! tombstoned and ReleaseSlot? → delete the stream
//! ```
//!
//! The identity checks run before the first write, so a rejected `add`/`save`
//! persists and publishes nothing. A subscriber never observes an event that
//! is not already in the store.
//!
//! ## Partial commits
//!
//! A store or publish error in the middle of a batch stops the commit:
//!
//! - events stored before the error stay stored and are gone from the buffer
//! - the buffer keeps only the events that were never stored
//! - an event that was stored but whose publication failed is not published
//!   again; rebuild the projections from the store to catch them up
//!
//! Once the first event is stored the stream exists, so the retry is `save`
//! (never `add`). It stores only the remaining tail and never duplicates.

use thiserror::Error;

use scrivener_core::{Aggregate, AggregateId, DomainError};
use scrivener_events::EventBus;

use crate::event_store::{EventStore, EventStoreError};

/// What happens to a stream once its aggregate is tombstoned.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Drop the stream after the tombstone is committed, so the identifier
    /// can be reused. Projections have already seen every event.
    #[default]
    ReleaseSlot,
    /// Keep the full stream for audit. The identifier stays taken.
    RetainHistory,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("aggregate has no identity")]
    MissingIdentity,

    #[error("aggregate {0} already exists")]
    DuplicateIdentity(AggregateId),

    #[error("aggregate {0} does not exist")]
    UnknownEntity(AggregateId),

    /// `add` was called on an aggregate with nothing to store.
    #[error("aggregate {0} has no events to add")]
    NothingToAdd(AggregateId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] EventStoreError),

    /// Publication failed after the event was stored.
    #[error("event publication failed: {0}")]
    Publish(String),
}

type Factory<A> = Box<dyn Fn() -> A + Send + Sync>;

/// Event-sourced repository for one aggregate type.
///
/// The factory produces a blank, un-identified instance; it is used as the
/// replay target in [`AggregateRepository::load`].
pub struct AggregateRepository<A, S, B> {
    factory: Factory<A>,
    store: S,
    bus: Option<B>,
    deletion_policy: DeletionPolicy,
}

impl<A, S, B> core::fmt::Debug for AggregateRepository<A, S, B>
where
    S: core::fmt::Debug,
    B: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AggregateRepository")
            .field("store", &self.store)
            .field("bus", &self.bus)
            .field("deletion_policy", &self.deletion_policy)
            .finish_non_exhaustive()
    }
}

impl<A, S, B> AggregateRepository<A, S, B>
where
    A: Aggregate,
    S: EventStore,
    B: EventBus,
{
    pub fn new(factory: impl Fn() -> A + Send + Sync + 'static, store: S, bus: Option<B>) -> Self {
        Self {
            factory: Box::new(factory),
            store,
            bus,
            deletion_policy: DeletionPolicy::default(),
        }
    }

    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }

    pub fn deletion_policy(&self) -> DeletionPolicy {
        self.deletion_policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a newly created aggregate.
    ///
    /// An empty unsaved buffer is rejected: it would leave no stream behind.
    pub fn add(&self, aggregate: &mut A) -> Result<(), RepositoryError> {
        let id = aggregate.id().cloned().ok_or(RepositoryError::MissingIdentity)?;
        if self.store.exists(&id)? {
            return Err(RepositoryError::DuplicateIdentity(id));
        }
        if aggregate.unsaved_events().is_empty() {
            return Err(RepositoryError::NothingToAdd(id));
        }
        self.commit(&id, aggregate)
    }

    /// Persist new events of an aggregate that already exists. An empty
    /// buffer is a no-op.
    pub fn save(&self, aggregate: &mut A) -> Result<(), RepositoryError> {
        let id = aggregate.id().cloned().ok_or(RepositoryError::MissingIdentity)?;
        if !self.store.exists(&id)? {
            return Err(RepositoryError::UnknownEntity(id));
        }
        self.commit(&id, aggregate)
    }

    /// Rebuild an aggregate from its history.
    ///
    /// An identifier without history yields a blank aggregate; the caller
    /// decides whether that means "not found".
    pub fn load(&self, id: &AggregateId) -> Result<A, RepositoryError> {
        let history = self.store.load_events(id)?;
        let mut aggregate = (self.factory)();
        aggregate.initialize(history.iter().map(|stored| stored.recorded()))?;
        tracing::trace!(aggregate_id = %id, events = history.len(), "aggregate loaded");
        Ok(aggregate)
    }

    /// Like [`AggregateRepository::load`], but an identifier without history
    /// is an error.
    pub fn load_existing(&self, id: &AggregateId) -> Result<A, RepositoryError> {
        if !self.store.exists(id)? {
            return Err(RepositoryError::UnknownEntity(id.clone()));
        }
        self.load(id)
    }

    fn commit(&self, id: &AggregateId, aggregate: &mut A) -> Result<(), RepositoryError> {
        while let Some(event) = aggregate.unsaved_events().first().cloned() {
            // 1) Store (source of truth)
            let stored = self.store.store_event(id, &event)?;
            aggregate.confirm_oldest_unsaved();

            // 2) Publish (after store)
            if let Some(bus) = &self.bus {
                bus.publish(&event)
                    .map_err(|e| RepositoryError::Publish(format!("{e:?}")))?;
            }

            tracing::debug!(
                aggregate_id = %id,
                event_type = event.event_type(),
                sequence_number = stored.sequence_number,
                "event committed"
            );
        }

        if aggregate.is_deleted() && self.deletion_policy == DeletionPolicy::ReleaseSlot {
            self.store.delete_events(id)?;
            tracing::debug!(aggregate_id = %id, "tombstoned stream released");
        }

        Ok(())
    }
}
