use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::bus::EventBus;

/// A projection builds a read model from published events.
///
/// Projections implement the **CQRS read model pattern**: they turn events
/// (write model) into queryable state (read model).
///
/// ## Lifecycle
///
/// 1. **Attach**: [`attach`] subscribes the projection to every type listed
///    by [`Projection::event_types`]
/// 2. **Handle**: each published payload is routed to [`Projection::handle`]
/// 3. **Query**: read accessors on the concrete type serve the current view
/// 4. **Rebuild**: [`crate::ProjectionRunner`] replays stored history into a
///    fresh instance
///
/// ## Disposability
///
/// Read models have no independent source of truth and no write API. Their
/// state changes only through `handle`, so they can always be thrown away
/// and rebuilt from the event stream.
///
/// ## Error handling
///
/// `handle` does not return errors. A payload the projection cannot use is
/// logged and skipped; the event is already stored, so the projection can be
/// rebuilt once the bug is fixed.
pub trait Projection: Send + Sync + 'static {
    /// Event types this projection consumes.
    fn event_types(&self) -> &'static [&'static str];

    /// Apply a single event payload to the read model.
    fn handle(&self, event_type: &str, payload: &JsonValue);
}

/// Subscribe `projection` to the bus for each of its event types.
pub fn attach<B, P>(bus: &B, projection: Arc<P>)
where
    B: EventBus + ?Sized,
    P: Projection,
{
    for &event_type in projection.event_types() {
        let target = projection.clone();
        bus.subscribe(
            event_type,
            Arc::new(move |payload: &JsonValue| target.handle(event_type, payload)),
        );
    }
}
