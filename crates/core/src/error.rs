//! Domain error model.

use thiserror::Error;

use crate::id::AggregateId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures raised while deciding or
/// applying events (validation, invariants, tombstones). Storage and
/// publication concerns belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An event envelope was malformed (empty type or missing payload).
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A command targeted an aggregate that has been tombstoned.
    #[error("entity {0} has been deleted")]
    EntityDeleted(AggregateId),

    /// A stored payload could not be decoded into the aggregate's event type.
    #[error("failed to decode event: {0}")]
    Deserialize(String),
}

impl DomainError {
    pub fn invalid_event(msg: impl Into<String>) -> Self {
        Self::InvalidEvent(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn deleted(id: AggregateId) -> Self {
        Self::EntityDeleted(id)
    }

    pub fn deserialize(msg: impl Into<String>) -> Self {
        Self::Deserialize(msg.into())
    }
}
