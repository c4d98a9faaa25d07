//! Configuration loading and representation.

use thiserror::Error;

pub const MAX_PAGE_SIZE_VAR: &str = "SPLITLEDGER_MAX_PAGE_SIZE";
pub const DEFAULT_PAGE_SIZE_VAR: &str = "SPLITLEDGER_DEFAULT_PAGE_SIZE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got `{value}`")]
    NotAPositiveInteger { key: &'static str, value: String },

    #[error("SPLITLEDGER_DEFAULT_PAGE_SIZE ({default}) cannot exceed SPLITLEDGER_MAX_PAGE_SIZE ({max})")]
    DefaultExceedsMax { default: usize, max: usize },
}

/// Runtime settings for the ledger service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Largest page the expense history will return.
    pub max_page_size: usize,
    /// Page size used when a caller does not ask for one.
    pub default_page_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_page_size: 500,
            default_page_size: 20,
        }
    }
}

impl LedgerConfig {
    /// Load from process environment, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let max_page_size = read_positive(&lookup, MAX_PAGE_SIZE_VAR)?.unwrap_or(defaults.max_page_size);
        let default_page_size = read_positive(&lookup, DEFAULT_PAGE_SIZE_VAR)?
            .unwrap_or_else(|| defaults.default_page_size.min(max_page_size));

        let config = Self {
            max_page_size,
            default_page_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::NotAPositiveInteger {
                key: MAX_PAGE_SIZE_VAR,
                value: "0".to_string(),
            });
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::NotAPositiveInteger {
                key: DEFAULT_PAGE_SIZE_VAR,
                value: "0".to_string(),
            });
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::DefaultExceedsMax {
                default: self.default_page_size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }
}

fn read_positive<F>(lookup: &F, key: &'static str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::NotAPositiveInteger { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<LedgerConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LedgerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(load(&[]).unwrap(), LedgerConfig::default());
    }

    #[test]
    fn reads_both_sizes() {
        let config = load(&[(MAX_PAGE_SIZE_VAR, "100"), (DEFAULT_PAGE_SIZE_VAR, " 10 ")]).unwrap();
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn small_max_clamps_the_default_default() {
        let config = load(&[(MAX_PAGE_SIZE_VAR, "5")]).unwrap();
        assert_eq!(config.default_page_size, 5);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(matches!(
            load(&[(MAX_PAGE_SIZE_VAR, "0")]),
            Err(ConfigError::NotAPositiveInteger { key: MAX_PAGE_SIZE_VAR, .. })
        ));
        assert!(matches!(
            load(&[(DEFAULT_PAGE_SIZE_VAR, "many")]),
            Err(ConfigError::NotAPositiveInteger { key: DEFAULT_PAGE_SIZE_VAR, .. })
        ));
    }

    #[test]
    fn default_cannot_exceed_max() {
        assert_eq!(
            load(&[(MAX_PAGE_SIZE_VAR, "10"), (DEFAULT_PAGE_SIZE_VAR, "11")]),
            Err(ConfigError::DefaultExceedsMax { default: 11, max: 10 })
        );
    }
}
