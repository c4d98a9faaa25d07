//! `splitledger-ledger` — the shared-expense ledger core.
//!
//! Pure domain: no IO, no logging. Orchestration lives in `splitledger-infra`.

pub mod activity;
pub mod command;
pub mod email;
pub mod event;
pub mod group;
pub mod group_name;
pub mod money;
pub mod participant;
pub mod settlement;
pub mod split;

pub use activity::{ExpenseActivity, MAX_DESCRIPTION_LENGTH};
pub use command::{ActivateGroup, AddParticipant, CreateGroup, GroupCommand, RecordActivity, Settle};
pub use email::ParticipantEmail;
pub use event::{
    ExpenseRecorded, GroupActivated, GroupCreated, LedgerEvent, ParticipantAdded, Posting,
    PostingDirection, SettlementCompleted,
};
pub use group::{ExpenseGroup, MIN_MEMBERS_FOR_ACTIVATION};
pub use group_name::{GroupName, MAX_GROUP_NAME_LENGTH};
pub use money::{MAX_AMOUNT, MONEY_SCALE, Money};
pub use participant::Participant;
pub use settlement::Settlement;
pub use split::ExpenseSplit;
