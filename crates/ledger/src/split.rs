use serde::{Deserialize, Serialize};

use splitledger_core::ParticipantId;

/// How an expense's cost is divided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "members", rename_all = "snake_case")]
pub enum ExpenseSplit {
    /// Evenly across everyone in the group at the time the expense is recorded.
    Even,
    /// Evenly across an explicit set of participants that always includes the payer.
    Custom(Vec<ParticipantId>),
}

impl Default for ExpenseSplit {
    fn default() -> Self {
        Self::Even
    }
}

impl ExpenseSplit {
    /// Custom split over `members` plus `payer`, deduplicated, first occurrence wins.
    pub fn custom_with_payer(
        members: impl IntoIterator<Item = ParticipantId>,
        payer: ParticipantId,
    ) -> Self {
        let mut ids: Vec<ParticipantId> = Vec::new();
        for id in members.into_iter().chain(core::iter::once(payer)) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self::Custom(ids)
    }

    pub fn is_even(&self) -> bool {
        matches!(self, Self::Even)
    }

    /// Whether `id` takes a share under this split (every member does for `Even`).
    pub fn includes(&self, id: ParticipantId) -> bool {
        match self {
            Self::Even => true,
            Self::Custom(ids) => ids.contains(&id),
        }
    }
}
