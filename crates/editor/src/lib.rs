//! Editor domain module (event-sourced).
//!
//! This crate contains the business rules for a single text document,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod command;
pub mod editor;
pub mod events;

pub use command::EditorCommand;
pub use editor::Editor;
pub use events::{EditorCreated, EditorDeleted, EditorEvent, TextAppended, TextDeleted};
