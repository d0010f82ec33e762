//! Projection implementations (read model builders).
//!
//! Projections consume editor events and build query-optimized read models.
//! All projections are:
//! - **Rebuildable**: can be reconstructed from the event stream
//! - **Read-only**: state changes only through published events
//! - **Lenient**: payloads they cannot use are logged and skipped

pub mod editor_content;
pub mod editor_list;

pub use editor_content::{EditorContent, EditorContentProjection};
pub use editor_list::{EditorListProjection, EditorSummary};

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Decode a payload into its event struct, or log and give up.
fn decode<T: DeserializeOwned>(event_type: &str, payload: &JsonValue) -> Option<T> {
    match serde_json::from_value(payload.clone()) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(event_type, error = %e, "malformed event payload; skipped");
            None
        }
    }
}
