//! Event distribution: the synchronous bus and the read-model contract.

pub mod bus;
pub mod in_memory_bus;
pub mod projection;
pub mod runner;

pub use bus::{EventBus, EventHandler};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use projection::{Projection, attach};
pub use runner::ProjectionRunner;
