//! `scrivener-core`: event-sourcing building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the event envelope, the typed-event contract, the aggregate contract and
//! identifiers.

pub mod aggregate;
pub mod error;
pub mod event;
pub mod id;

pub use aggregate::{Aggregate, AggregateCore};
pub use error::{DomainError, DomainResult};
pub use event::{Event, RecordedEvent};
pub use id::{AggregateId, IdGenerator};
