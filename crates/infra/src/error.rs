use thiserror::Error;

use splitledger_core::DomainError;

use crate::repository::RepositoryError;

/// Failure of a ledger use case, with a stable caller-facing code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate participant: {0}")]
    DuplicateParticipant(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// A broken ledger invariant. Always a bug, never bad input.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::DuplicateParticipant(_) => "DUPLICATE_PARTICIPANT",
            LedgerError::InvalidState(_) => "INVALID_STATE",
            LedgerError::Conflict(_) => "CONFLICT",
            LedgerError::InvariantViolation(_) | LedgerError::Storage(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => LedgerError::Validation(msg),
            DomainError::InvalidId(msg) => LedgerError::Validation(msg),
            DomainError::NotFound(msg) => LedgerError::NotFound(msg),
            DomainError::DuplicateParticipant(msg) => LedgerError::DuplicateParticipant(msg),
            DomainError::InvalidState(msg) => LedgerError::InvalidState(msg),
            DomainError::Conflict(msg) => LedgerError::Conflict(msg),
            DomainError::InvariantViolation(msg) => LedgerError::InvariantViolation(msg),
        }
    }
}

impl From<RepositoryError> for LedgerError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(id) => LedgerError::NotFound(format!("group {id}")),
            RepositoryError::Concurrency(msg) => LedgerError::Conflict(msg),
            RepositoryError::DuplicateName(name) => {
                LedgerError::Conflict(format!("a group named `{name}` already exists"))
            }
            RepositoryError::Storage(msg) => LedgerError::Storage(msg),
        }
    }
}
