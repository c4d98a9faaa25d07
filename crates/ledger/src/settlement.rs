use serde::Serialize;

use splitledger_core::{DomainError, DomainResult, ParticipantId};

use crate::money::Money;

/// A direct payment from one participant to another inside a group.
///
/// `from` is paying off what they owe; `to` receives the money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    from: ParticipantId,
    to: ParticipantId,
    amount: Money,
}

impl Settlement {
    pub fn new(from: ParticipantId, to: ParticipantId, amount: Money) -> DomainResult<Self> {
        if from == to {
            return Err(DomainError::validation("a participant cannot settle with themselves"));
        }
        if amount.is_non_positive() {
            return Err(DomainError::validation("settlement amount must be positive"));
        }
        Ok(Self { from, to, amount })
    }

    pub fn from(&self) -> ParticipantId {
        self.from
    }

    pub fn to(&self) -> ParticipantId {
        self.to
    }

    pub fn amount(&self) -> Money {
        self.amount
    }
}
