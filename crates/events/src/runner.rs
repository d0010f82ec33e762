//! Projection rebuild utilities.
//!
//! Read models are **disposable**; events are the source of truth. The runner
//! replays history straight into a projection, without a bus.

use scrivener_core::RecordedEvent;

use crate::Projection;

/// Feeds recorded events through a projection and counts what it routed.
#[derive(Debug)]
pub struct ProjectionRunner<P>
where
    P: Projection,
{
    projection: P,
    applied: u64,
}

impl<P> ProjectionRunner<P>
where
    P: Projection,
{
    pub fn new(projection: P) -> Self {
        Self {
            projection,
            applied: 0,
        }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn into_projection(self) -> P {
        self.projection
    }

    /// Number of events routed to the projection so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Route one event, if the projection consumes its type.
    pub fn apply(&mut self, event: &RecordedEvent) {
        if self.projection.event_types().contains(&event.event_type()) {
            self.projection.handle(event.event_type(), event.payload());
            self.applied += 1;
        }
    }

    /// Apply many events in order.
    pub fn run<'a>(&mut self, events: impl IntoIterator<Item = &'a RecordedEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    /// Rebuild a projection from scratch by replaying the full event history.
    ///
    /// The factory is used to create a fresh projection instance.
    pub fn rebuild_from_scratch<'a>(
        factory: impl FnOnce() -> P,
        events: impl IntoIterator<Item = &'a RecordedEvent>,
    ) -> P {
        let mut runner = ProjectionRunner::new(factory());
        runner.run(events);
        tracing::debug!(applied = runner.applied, "projection rebuilt");
        runner.projection
    }
}
