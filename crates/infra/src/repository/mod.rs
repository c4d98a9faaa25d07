//! Whole-aggregate persistence for expense groups.

use std::sync::Arc;

use thiserror::Error;

use splitledger_core::{ExpectedVersion, GroupId};
use splitledger_ledger::{ExpenseGroup, GroupName};

pub mod in_memory;

pub use in_memory::InMemoryGroupRepository;

/// Store operation error.
///
/// Infrastructure failures, as opposed to domain errors (validation,
/// invariants). `DuplicateName` is the store-side half of group name
/// uniqueness; the service pre-checks with `exists_by_name` as well.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("group {0} not found")]
    NotFound(GroupId),

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("a group named `{0}` already exists")]
    DuplicateName(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Store for `ExpenseGroup` aggregates.
///
/// `save` persists the whole aggregate as one unit. Implementations must:
/// - compare `expected` against the stored version (0 when absent) and fail
///   with `Concurrency` on mismatch
/// - reject inserting a group whose name is already taken by another group
/// - never persist pending events (callers drain them before saving)
pub trait ExpenseGroupRepository: Send + Sync {
    fn load(&self, id: GroupId) -> Result<ExpenseGroup, RepositoryError>;

    fn save(&self, group: &ExpenseGroup, expected: ExpectedVersion) -> Result<(), RepositoryError>;

    fn exists_by_name(&self, name: &GroupName) -> Result<bool, RepositoryError>;

    /// Every stored group, oldest first.
    fn find_all(&self) -> Result<Vec<ExpenseGroup>, RepositoryError>;
}

impl<R> ExpenseGroupRepository for Arc<R>
where
    R: ExpenseGroupRepository + ?Sized,
{
    fn load(&self, id: GroupId) -> Result<ExpenseGroup, RepositoryError> {
        (**self).load(id)
    }

    fn save(&self, group: &ExpenseGroup, expected: ExpectedVersion) -> Result<(), RepositoryError> {
        (**self).save(group, expected)
    }

    fn exists_by_name(&self, name: &GroupName) -> Result<bool, RepositoryError> {
        (**self).exists_by_name(name)
    }

    fn find_all(&self) -> Result<Vec<ExpenseGroup>, RepositoryError> {
        (**self).find_all()
    }
}
