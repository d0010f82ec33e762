//! In-memory event bus.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use scrivener_core::RecordedEvent;

use crate::bus::{EventBus, EventHandler};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("event bus lock poisoned")]
    Poisoned,
}

/// In-process pub/sub bus.
///
/// - No IO / no async
/// - Handlers run on the publishing thread
/// - The handler list is snapshotted before dispatch, so the lock is not held
///   while handlers execute
#[derive(Default)]
pub struct InMemoryEventBus {
    subscribers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl core::fmt::Debug for InMemoryEventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let types = self
            .subscribers
            .read()
            .map(|subs| subs.iter().map(|(t, hs)| (t.clone(), hs.len())).collect::<Vec<_>>())
            .unwrap_or_default();
        f.debug_struct("InMemoryEventBus")
            .field("subscribers", &types)
            .finish()
    }
}

impl EventBus for InMemoryEventBus {
    type Error = InMemoryBusError;

    fn subscribe(&self, event_type: &str, handler: EventHandler) {
        // A poisoned lock means a handler panicked mid-subscribe; the bus keeps
        // working for existing subscribers but cannot take new ones.
        match self.subscribers.write() {
            Ok(mut subs) => {
                subs.entry(event_type.to_string()).or_default().push(handler);
                tracing::debug!(event_type, "handler subscribed");
            }
            Err(_) => tracing::warn!(event_type, "cannot subscribe: event bus lock poisoned"),
        }
    }

    fn publish(&self, event: &RecordedEvent) -> Result<(), Self::Error> {
        let handlers = {
            let subs = self.subscribers.read().map_err(|_| InMemoryBusError::Poisoned)?;
            match subs.get(event.event_type()) {
                Some(hs) => hs.clone(),
                None => {
                    tracing::trace!(event_type = event.event_type(), "no subscribers");
                    return Ok(());
                }
            }
        };

        tracing::debug!(
            event_type = event.event_type(),
            handlers = handlers.len(),
            "publishing event"
        );
        for handler in &handlers {
            handler(event.payload());
        }
        Ok(())
    }

    fn subscriber_count(&self, event_type: &str) -> usize {
        self.subscribers
            .read()
            .map(|subs| subs.get(event_type).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}
