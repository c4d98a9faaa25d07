use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult};

/// Longest accepted group name, counted in characters after trimming.
pub const MAX_GROUP_NAME_LENGTH: usize = 50;

/// A trimmed, non-empty group name of at most 50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupName(String);

impl GroupName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("group name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_GROUP_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "group name cannot be longer than {MAX_GROUP_NAME_LENGTH} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Placeholder for a group that has not been created yet.
    pub(crate) fn unset() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for GroupName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GroupName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GroupName> for String {
    fn from(value: GroupName) -> Self {
        value.0
    }
}
