//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure the ledger can report is one of these variants, so callers can
/// map them deterministically to their own responses. Storage and transport
/// failures belong to the layers that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad input shape or value (empty name, non-positive amount, malformed email).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced group or participant does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The participant is already a member of the group.
    #[error("duplicate participant: {0}")]
    DuplicateParticipant(String),

    /// The operation violates a lifecycle precondition (e.g. activating with fewer than two members).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A uniqueness or optimistic concurrency conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An internal invariant was violated. Never caused by user input.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn duplicate_participant(msg: impl Into<String>) -> Self {
        Self::DuplicateParticipant(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
