//! Infrastructure layer: group store, locking, config, and use-case orchestration.

pub mod config;
pub mod error;
pub mod handlers;
pub mod locks;
pub mod repository;
pub mod service;
pub mod views;


pub use config::{ConfigError, LedgerConfig};
pub use error::LedgerError;
pub use handlers::LoggingEventHandler;
pub use locks::GroupLocks;
pub use repository::{ExpenseGroupRepository, InMemoryGroupRepository, RepositoryError};
pub use service::{LedgerEnvelope, LedgerService};
pub use views::{ActivityView, ExpenseHistoryPage, GroupDetail, GroupSummary, ParticipantBalance};
