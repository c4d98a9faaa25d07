//! Plain-data results returned by `LedgerService` queries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use splitledger_core::{ActivityId, GroupId, ParticipantId};
use splitledger_ledger::{ExpenseActivity, ExpenseGroup, ExpenseSplit, Money, Participant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantBalance {
    pub participant_id: ParticipantId,
    pub email: String,
    pub balance: Money,
}

impl From<&Participant> for ParticipantBalance {
    fn from(p: &Participant) -> Self {
        Self {
            participant_id: p.id(),
            email: p.email().to_string(),
            balance: p.balance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
}

impl From<&ExpenseGroup> for GroupSummary {
    fn from(g: &ExpenseGroup) -> Self {
        Self {
            id: g.group_id(),
            name: g.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDetail {
    pub id: GroupId,
    pub name: String,
    pub creator_email: Option<String>,
    pub activated: bool,
    pub participants: Vec<ParticipantBalance>,
}

impl From<&ExpenseGroup> for GroupDetail {
    fn from(g: &ExpenseGroup) -> Self {
        Self {
            id: g.group_id(),
            name: g.name().to_string(),
            creator_email: g.creator().map(|c| c.email().to_string()),
            activated: g.is_activated(),
            participants: g.participants().iter().map(ParticipantBalance::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityView {
    pub id: ActivityId,
    pub description: String,
    pub amount: Money,
    pub paid_by: ParticipantId,
    pub split: ExpenseSplit,
    pub recorded_at: DateTime<Utc>,
}

impl From<&ExpenseActivity> for ActivityView {
    fn from(a: &ExpenseActivity) -> Self {
        Self {
            id: a.id(),
            description: a.description().to_string(),
            amount: a.amount(),
            paid_by: a.paid_by(),
            split: a.split().clone(),
            recorded_at: a.recorded_at(),
        }
    }
}

/// One page of a group's expenses, in the order they were recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseHistoryPage {
    pub items: Vec<ActivityView>,
    /// Zero-based.
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl ExpenseHistoryPage {
    /// Slice `activities` into the requested page. `size` must be non-zero.
    pub fn slice(activities: &[ExpenseActivity], page: usize, size: usize) -> Self {
        let total_elements = activities.len();
        let total_pages = total_elements.div_ceil(size);
        let items = activities
            .iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .map(ActivityView::from)
            .collect();
        Self {
            items,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}
