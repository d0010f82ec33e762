//! Append-only event store boundary.
//!
//! This module defines the storage abstraction the repository writes through
//! and its in-memory implementation.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use r#trait::{EventStore, EventStoreError, StoredEvent};
