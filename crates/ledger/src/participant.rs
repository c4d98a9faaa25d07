use serde::Serialize;

use splitledger_core::{DomainError, DomainResult, ParticipantId};

use crate::email::ParticipantEmail;
use crate::money::Money;

/// A member of an expense group with a running balance.
///
/// Positive balance: the group owes this participant. Negative: they owe the
/// group. The balance only moves through [`Participant::credit`] and
/// [`Participant::debit`], which the owning group drives in offsetting pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    id: ParticipantId,
    email: ParticipantEmail,
    balance: Money,
}

impl Participant {
    /// New participant with a generated id and a zero balance.
    pub fn with_email(email: &str) -> DomainResult<Self> {
        Ok(Self::joined(ParticipantId::new(), ParticipantEmail::parse(email)?))
    }

    pub(crate) fn joined(id: ParticipantId, email: ParticipantEmail) -> Self {
        Self {
            id,
            email,
            balance: Money::zero(),
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn email(&self) -> &ParticipantEmail {
        &self.email
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub(crate) fn credit(&mut self, amount: Money) -> DomainResult<()> {
        if amount.is_non_positive() {
            return Err(DomainError::validation("cannot credit a zero or negative amount"));
        }
        self.balance = self.balance.checked_add(&amount)?;
        Ok(())
    }

    pub(crate) fn debit(&mut self, amount: Money) -> DomainResult<()> {
        if amount.is_non_positive() {
            return Err(DomainError::validation("cannot debit a zero or negative amount"));
        }
        self.balance = self.balance.checked_sub(&amount)?;
        Ok(())
    }
}
