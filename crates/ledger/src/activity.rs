use chrono::{DateTime, Utc};
use serde::Serialize;

use splitledger_core::{ActivityId, DomainError, DomainResult, ParticipantId};

use crate::money::Money;
use crate::split::ExpenseSplit;

/// Longest accepted description, counted in characters after trimming.
pub const MAX_DESCRIPTION_LENGTH: usize = 50;

/// One recorded expense. Immutable once appended to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseActivity {
    id: ActivityId,
    description: String,
    amount: Money,
    paid_by: ParticipantId,
    split: ExpenseSplit,
    recorded_at: DateTime<Utc>,
}

impl ExpenseActivity {
    pub fn new(
        id: ActivityId,
        description: &str,
        amount: Money,
        paid_by: ParticipantId,
        split: ExpenseSplit,
        recorded_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let description = validate_description(description)?;
        if amount.is_non_positive() {
            return Err(DomainError::validation("expense amount must be positive and non-zero"));
        }
        Ok(Self {
            id,
            description,
            amount,
            paid_by,
            split,
            recorded_at,
        })
    }

    pub fn id(&self) -> ActivityId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn paid_by(&self) -> ParticipantId {
        self.paid_by
    }

    pub fn split(&self) -> &ExpenseSplit {
        &self.split
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Trim and bound-check a description, returning the stored form.
pub fn validate_description(raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("expense description cannot be empty"));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(DomainError::validation(format!(
            "expense description cannot be longer than {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}
