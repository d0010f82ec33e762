//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus is a **dispatch fabric**, not storage: the event store is the
//! source of truth and events are published only after they were stored.
//!
//! ```text
//! Repository → Event Store (store event) → Event Bus (publish) → Projections
//! ```
//!
//! Dispatch is synchronous. `publish` returns only after every handler
//! registered for the event's type has run, in registration order. Handlers
//! receive the payload alone; they never see the type or the envelope.
//!
//! Handlers must not publish. The repository's commit path is the only
//! publisher, which keeps one batch's events from interleaving.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use scrivener_core::RecordedEvent;

/// A subscriber callback. Receives the event payload only.
pub type EventHandler = Arc<dyn Fn(&JsonValue) + Send + Sync>;

/// Type-keyed publish/subscribe dispatcher.
pub trait EventBus: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// Register `handler` for `event_type`. Several handlers per type are
    /// allowed; they are invoked in registration order.
    fn subscribe(&self, event_type: &str, handler: EventHandler);

    /// Invoke every handler registered for the event's type. Publishing a
    /// type nobody subscribed to is a no-op.
    fn publish(&self, event: &RecordedEvent) -> Result<(), Self::Error>;

    /// Number of handlers currently registered for `event_type`.
    fn subscriber_count(&self, event_type: &str) -> usize;
}

impl<B> EventBus for Arc<B>
where
    B: EventBus + ?Sized,
{
    type Error = B::Error;

    fn subscribe(&self, event_type: &str, handler: EventHandler) {
        (**self).subscribe(event_type, handler)
    }

    fn publish(&self, event: &RecordedEvent) -> Result<(), Self::Error> {
        (**self).publish(event)
    }

    fn subscriber_count(&self, event_type: &str) -> usize {
        (**self).subscriber_count(event_type)
    }
}
