use std::collections::BTreeMap;
use std::sync::RwLock;

use splitledger_core::{AggregateRoot, ExpectedVersion, GroupId};
use splitledger_ledger::{ExpenseGroup, GroupName};

use super::{ExpenseGroupRepository, RepositoryError};

/// In-memory group store.
///
/// Intended for tests/dev. Ids are UUIDv7, so key order is creation order.
#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: RwLock<BTreeMap<GroupId, ExpenseGroup>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.groups.read().map_err(|_| poisoned())?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Storage("group store lock poisoned".to_string())
}

impl ExpenseGroupRepository for InMemoryGroupRepository {
    fn load(&self, id: GroupId) -> Result<ExpenseGroup, RepositoryError> {
        let groups = self.groups.read().map_err(|_| poisoned())?;
        groups.get(&id).cloned().ok_or(RepositoryError::NotFound(id))
    }

    fn save(&self, group: &ExpenseGroup, expected: ExpectedVersion) -> Result<(), RepositoryError> {
        if !group.pending_events().is_empty() {
            return Err(RepositoryError::Storage(
                "refusing to save a group with undrained events".to_string(),
            ));
        }

        let mut groups = self.groups.write().map_err(|_| poisoned())?;
        let id = group.group_id();
        let stored_version = groups.get(&id).map(|g| g.version()).unwrap_or(0);

        expected
            .check(stored_version)
            .map_err(|e| RepositoryError::Concurrency(e.to_string()))?;

        let name_taken = groups
            .values()
            .any(|other| other.group_id() != id && other.name() == group.name());
        if name_taken {
            return Err(RepositoryError::DuplicateName(group.name().to_string()));
        }

        groups.insert(id, group.clone());
        Ok(())
    }

    fn exists_by_name(&self, name: &GroupName) -> Result<bool, RepositoryError> {
        let groups = self.groups.read().map_err(|_| poisoned())?;
        Ok(groups.values().any(|g| g.name() == name))
    }

    fn find_all(&self) -> Result<Vec<ExpenseGroup>, RepositoryError> {
        let groups = self.groups.read().map_err(|_| poisoned())?;
        Ok(groups.values().cloned().collect())
    }
}
