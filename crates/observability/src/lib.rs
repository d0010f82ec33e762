//! Logging setup shared by every binary.

pub mod subscriber;

pub use subscriber::{init, init_with_filter};
