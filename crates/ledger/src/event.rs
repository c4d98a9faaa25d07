use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{ActivityId, DomainError, DomainResult, GroupId, ParticipantId};
use splitledger_events::Event;

use crate::email::ParticipantEmail;
use crate::group_name::GroupName;
use crate::money::Money;
use crate::split::ExpenseSplit;

/// Side of a balance posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingDirection {
    /// Raises the balance (the group owes the participant more).
    Credit,
    /// Lowers the balance (the participant owes the group more).
    Debit,
}

/// One balance change carried by an event. `amount` is strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub participant_id: ParticipantId,
    pub direction: PostingDirection,
    pub amount: Money,
}

impl Posting {
    pub fn credit(participant_id: ParticipantId, amount: Money) -> Self {
        Self {
            participant_id,
            direction: PostingDirection::Credit,
            amount,
        }
    }

    pub fn debit(participant_id: ParticipantId, amount: Money) -> Self {
        Self {
            participant_id,
            direction: PostingDirection::Debit,
            amount,
        }
    }

    /// Signed effect on the participant's balance.
    pub fn signed_amount(&self) -> Money {
        match self.direction {
            PostingDirection::Credit => self.amount,
            PostingDirection::Debit => self.amount.negate(),
        }
    }
}

/// Fails unless the postings net to exactly zero.
pub fn ensure_balanced(postings: &[Posting]) -> DomainResult<()> {
    let net = postings.iter().try_fold(Decimal::ZERO, |acc, p| {
        acc.checked_add(p.signed_amount().amount())
            .ok_or_else(|| DomainError::invariant("posting total overflowed"))
    })?;
    if net.is_zero() {
        Ok(())
    } else {
        Err(DomainError::invariant(format!("postings do not net to zero (net: {net})")))
    }
}

/// Event: GroupCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCreated {
    pub group_id: GroupId,
    pub name: GroupName,
    pub creator_id: ParticipantId,
    pub creator_email: ParticipantEmail,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ParticipantAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantAdded {
    pub group_id: GroupId,
    pub participant_id: ParticipantId,
    pub email: ParticipantEmail,
    pub occurred_at: DateTime<Utc>,
}

/// Event: GroupActivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupActivated {
    pub group_id: GroupId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ExpenseRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecorded {
    pub group_id: GroupId,
    pub activity_id: ActivityId,
    pub description: String,
    pub amount: Money,
    pub paid_by: ParticipantId,
    pub split: ExpenseSplit,
    pub postings: Vec<Posting>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SettlementCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementCompleted {
    pub group_id: GroupId,
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
    pub postings: Vec<Posting>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    GroupCreated(GroupCreated),
    ParticipantAdded(ParticipantAdded),
    GroupActivated(GroupActivated),
    ExpenseRecorded(ExpenseRecorded),
    SettlementCompleted(SettlementCompleted),
}

impl LedgerEvent {
    pub fn group_id(&self) -> GroupId {
        match self {
            LedgerEvent::GroupCreated(e) => e.group_id,
            LedgerEvent::ParticipantAdded(e) => e.group_id,
            LedgerEvent::GroupActivated(e) => e.group_id,
            LedgerEvent::ExpenseRecorded(e) => e.group_id,
            LedgerEvent::SettlementCompleted(e) => e.group_id,
        }
    }

    /// Balance postings carried by this event (empty for membership/lifecycle events).
    pub fn postings(&self) -> &[Posting] {
        match self {
            LedgerEvent::ExpenseRecorded(e) => &e.postings,
            LedgerEvent::SettlementCompleted(e) => &e.postings,
            _ => &[],
        }
    }
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::GroupCreated(_) => "ledger.group.created",
            LedgerEvent::ParticipantAdded(_) => "ledger.group.participant_added",
            LedgerEvent::GroupActivated(_) => "ledger.group.activated",
            LedgerEvent::ExpenseRecorded(_) => "ledger.group.expense_recorded",
            LedgerEvent::SettlementCompleted(_) => "ledger.group.settlement_completed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::GroupCreated(e) => e.occurred_at,
            LedgerEvent::ParticipantAdded(e) => e.occurred_at,
            LedgerEvent::GroupActivated(e) => e.occurred_at,
            LedgerEvent::ExpenseRecorded(e) => e.occurred_at,
            LedgerEvent::SettlementCompleted(e) => e.occurred_at,
        }
    }
}
