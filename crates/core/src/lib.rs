//! `splitledger-core`: identifiers, the domain error type, and the aggregate
//! contract shared by every ledger crate. No IO lives here.

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{ActivityId, GroupId, ParticipantId};
