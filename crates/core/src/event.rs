//! Events: the untyped envelope and the typed-event contract.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::DomainError;

/// An immutable `(type, payload)` pair.
///
/// This is the unit the event store persists and the event bus dispatches.
/// Construction rejects an empty type or a `null` payload, and so does
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct RecordedEvent {
    #[serde(rename = "type")]
    event_type: String,
    payload: JsonValue,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    payload: JsonValue,
}

impl TryFrom<RawEvent> for RecordedEvent {
    type Error = DomainError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        Self::new(raw.event_type, raw.payload)
    }
}

impl RecordedEvent {
    pub fn new(event_type: impl Into<String>, payload: JsonValue) -> Result<Self, DomainError> {
        let event_type = event_type.into();
        if event_type.trim().is_empty() {
            return Err(DomainError::invalid_event("event type cannot be empty"));
        }
        if payload.is_null() {
            return Err(DomainError::invalid_event(format!(
                "event '{event_type}' has no payload"
            )));
        }
        Ok(Self {
            event_type,
            payload,
        })
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    pub fn into_parts(self) -> (String, JsonValue) {
        (self.event_type, self.payload)
    }
}

/// A typed domain event.
///
/// Implementors are closed enums serialized adjacently tagged as
/// `{"type": .., "payload": ..}`, with a `#[serde(other)]` unit variant that
/// absorbs event types this code does not know about. `TYPES` lists the tags
/// of every known variant.
pub trait Event: Clone + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Tags of all known variants.
    const TYPES: &'static [&'static str];

    /// Stable type tag of this event (e.g. `"EditorCreated"`).
    ///
    /// The catch-all variant returns an empty string, which makes it
    /// impossible to record.
    fn event_type(&self) -> &'static str;

    /// Encode into an envelope, validating type and payload.
    fn to_recorded(&self) -> Result<RecordedEvent, DomainError> {
        let value = serde_json::to_value(self)
            .map_err(|e| DomainError::invalid_event(format!("payload serialization failed: {e}")))?;
        let payload = value.get("payload").cloned().unwrap_or(JsonValue::Null);
        RecordedEvent::new(self.event_type(), payload)
    }

    /// Decode an envelope. Unknown types map onto the catch-all variant.
    fn from_recorded(event: &RecordedEvent) -> Result<Self, DomainError> {
        let tagged = if Self::TYPES.contains(&event.event_type()) {
            serde_json::json!({ "type": event.event_type(), "payload": event.payload() })
        } else {
            serde_json::json!({ "type": event.event_type() })
        };
        serde_json::from_value(tagged).map_err(|e| {
            DomainError::deserialize(format!("'{}': {e}", event.event_type()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", content = "payload")]
    enum Sample {
        Renamed { name: String },
        Bumped(u32),
        #[serde(other)]
        Unknown,
    }

    impl Event for Sample {
        const TYPES: &'static [&'static str] = &["Renamed", "Bumped"];

        fn event_type(&self) -> &'static str {
            match self {
                Sample::Renamed { .. } => "Renamed",
                Sample::Bumped(_) => "Bumped",
                Sample::Unknown => "",
            }
        }
    }

    #[test]
    fn envelope_requires_type_and_payload() {
        assert!(matches!(
            RecordedEvent::new("", json!({})),
            Err(DomainError::InvalidEvent(_))
        ));
        assert!(matches!(
            RecordedEvent::new("Thing", JsonValue::Null),
            Err(DomainError::InvalidEvent(_))
        ));
        assert!(RecordedEvent::new("Thing", json!("Payload")).is_ok());
    }

    #[test]
    fn envelopes_compare_structurally() {
        let a = RecordedEvent::new("A", json!({"sequence": 1})).unwrap();
        let b = RecordedEvent::new("A", json!({"sequence": 1})).unwrap();
        let c = RecordedEvent::new("A", json!({"sequence": 2})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn deserializing_an_invalid_envelope_fails() {
        let err = serde_json::from_value::<RecordedEvent>(json!({"type": "A"}));
        assert!(err.is_err());
        let ok: RecordedEvent =
            serde_json::from_value(json!({"type": "A", "payload": {}})).unwrap();
        assert_eq!(ok.event_type(), "A");
    }

    #[test]
    fn typed_events_encode_into_type_and_payload() {
        let recorded = Sample::Renamed { name: "x".into() }.to_recorded().unwrap();
        assert_eq!(recorded.event_type(), "Renamed");
        assert_eq!(recorded.payload(), &json!({"name": "x"}));

        let decoded = Sample::from_recorded(&recorded).unwrap();
        assert_eq!(decoded, Sample::Renamed { name: "x".into() });
    }

    #[test]
    fn unknown_types_decode_to_the_catch_all() {
        let future = RecordedEvent::new("AddedLater", json!({"anything": true})).unwrap();
        assert_eq!(Sample::from_recorded(&future).unwrap(), Sample::Unknown);
    }

    #[test]
    fn catch_all_cannot_be_recorded() {
        assert!(matches!(
            Sample::Unknown.to_recorded(),
            Err(DomainError::InvalidEvent(_))
        ));
    }

    #[test]
    fn malformed_payload_of_a_known_type_is_an_error() {
        let bad = RecordedEvent::new("Bumped", json!("not a number")).unwrap();
        assert!(matches!(
            Sample::from_recorded(&bad),
            Err(DomainError::Deserialize(_))
        ));
    }
}
