//! Use-case orchestration for the expense ledger.
//!
//! Every mutating operation runs the same cycle under the group's lock:
//!
//! ```text
//! lock(group_id)
//!   ↓
//! 1. Load the group from the store
//!   ↓
//! 2. Run one aggregate operation (pure; queues pending events)
//!   ↓
//! 3. Drain pending events, save with ExpectedVersion::Exact(loaded version)
//!   ↓
//! 4. Publish each event to the registered handlers
//! ```
//!
//! Nothing is published unless the save succeeded. Handler failures are
//! logged by the publisher and never undo the save.

use rust_decimal::Decimal;
use tracing::{debug, info};

use splitledger_core::{ActivityId, AggregateRoot, DomainResult, ExpectedVersion, GroupId, ParticipantId};
use splitledger_events::{EventEnvelope, EventPublisher};
use splitledger_ledger::{ExpenseGroup, GroupName, LedgerEvent, Money, Participant, Settlement};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::locks::GroupLocks;
use crate::repository::ExpenseGroupRepository;
use crate::views::{ExpenseHistoryPage, GroupDetail, GroupSummary, ParticipantBalance};

/// Envelope type delivered to ledger event handlers.
pub type LedgerEnvelope = EventEnvelope<LedgerEvent>;

#[derive(Debug)]
pub struct LedgerService<R, P> {
    repository: R,
    publisher: P,
    locks: GroupLocks,
    config: LedgerConfig,
}

impl<R, P> LedgerService<R, P> {
    pub fn new(repository: R, publisher: P) -> Self {
        Self::with_config(repository, publisher, LedgerConfig::default())
    }

    pub fn with_config(repository: R, publisher: P, config: LedgerConfig) -> Self {
        Self {
            repository,
            publisher,
            locks: GroupLocks::new(),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

impl<R, P> LedgerService<R, P>
where
    R: ExpenseGroupRepository,
    P: EventPublisher<LedgerEnvelope>,
{
    /// Create a group whose only member is the creator.
    ///
    /// Fails with `Conflict` if the trimmed name is already taken.
    pub fn create_group(&self, name: &str, creator_email: &str) -> Result<GroupId, LedgerError> {
        let name = GroupName::parse(name)?;
        if self.repository.exists_by_name(&name)? {
            return Err(LedgerError::Conflict(format!("a group named `{name}` already exists")));
        }

        let group = ExpenseGroup::create(name.as_str(), creator_email)?;
        let group_id = group.group_id();
        self.locks.with_lock(group_id, || self.commit(group, 0))?;

        info!(group_id = %group_id, name = %name, "group created");
        Ok(group_id)
    }

    pub fn add_participant(&self, group_id: GroupId, email: &str) -> Result<ParticipantId, LedgerError> {
        let participant = Participant::with_email(email)?;
        let participant_id = self.mutate(group_id, |group| group.add_participant(participant))?;

        info!(group_id = %group_id, participant_id = %participant_id, "participant added");
        Ok(participant_id)
    }

    pub fn activate_group(&self, group_id: GroupId) -> Result<(), LedgerError> {
        self.mutate(group_id, ExpenseGroup::activate)?;
        info!(group_id = %group_id, "group activated");
        Ok(())
    }

    /// Record an expense. `split_with` of `None` or an empty list splits
    /// across every current member.
    pub fn record_activity(
        &self,
        group_id: GroupId,
        description: &str,
        amount: Decimal,
        paid_by: ParticipantId,
        split_with: Option<Vec<ParticipantId>>,
    ) -> Result<ActivityId, LedgerError> {
        let amount = Money::of(amount)?;
        let activity_id = self.mutate(group_id, |group| {
            group.record_activity(description, amount, paid_by, split_with)
        })?;

        info!(
            group_id = %group_id,
            activity_id = %activity_id,
            paid_by = %paid_by,
            amount = %amount,
            "expense recorded"
        );
        Ok(activity_id)
    }

    pub fn settle(
        &self,
        group_id: GroupId,
        from: ParticipantId,
        to: ParticipantId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let settlement = Settlement::new(from, to, Money::of(amount)?)?;
        self.mutate(group_id, |group| group.settle(settlement))?;

        info!(
            group_id = %group_id,
            from = %from,
            to = %to,
            amount = %settlement.amount(),
            "settlement completed"
        );
        Ok(())
    }

    /// Balances in membership order (creator first).
    pub fn get_balances(&self, group_id: GroupId) -> Result<Vec<ParticipantBalance>, LedgerError> {
        let group = self.repository.load(group_id)?;
        Ok(group.participants().iter().map(ParticipantBalance::from).collect())
    }

    pub fn get_group(&self, group_id: GroupId) -> Result<GroupDetail, LedgerError> {
        let group = self.repository.load(group_id)?;
        Ok(GroupDetail::from(&group))
    }

    pub fn list_groups(&self) -> Result<Vec<GroupSummary>, LedgerError> {
        let groups = self.repository.find_all()?;
        Ok(groups.iter().map(GroupSummary::from).collect())
    }

    /// Page through a group's expenses in recording order.
    ///
    /// `page` is zero-based; `size` defaults to the configured default page
    /// size and must lie in `1..=max_page_size`.
    pub fn expense_history(
        &self,
        group_id: GroupId,
        page: usize,
        size: Option<usize>,
    ) -> Result<ExpenseHistoryPage, LedgerError> {
        let size = size.unwrap_or(self.config.default_page_size);
        if size == 0 || size > self.config.max_page_size {
            return Err(LedgerError::Validation(format!(
                "page size must be between 1 and {}",
                self.config.max_page_size
            )));
        }
        let group = self.repository.load(group_id)?;
        Ok(ExpenseHistoryPage::slice(group.activities(), page, size))
    }

    fn mutate<T, F>(&self, group_id: GroupId, op: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut ExpenseGroup) -> DomainResult<T>,
    {
        self.locks.with_lock(group_id, || {
            let mut group = self.repository.load(group_id)?;
            let loaded_version = group.version();
            let out = op(&mut group)?;
            self.commit(group, loaded_version)?;
            Ok(out)
        })
    }

    fn commit(&self, mut group: ExpenseGroup, loaded_version: u64) -> Result<(), LedgerError> {
        let events = group.take_pending_events();
        self.repository
            .save(&group, ExpectedVersion::Exact(loaded_version))?;

        let group_id = group.group_id();
        for (sequence, event) in (loaded_version + 1..).zip(events) {
            let envelope = EventEnvelope::wrap(group_id, sequence, event);
            let report = self.publisher.publish(&envelope);
            debug!(
                group_id = %group_id,
                event_type = envelope.event_type(),
                sequence,
                delivered = report.delivered,
                failed = report.failures.len(),
                "ledger event published"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rust_decimal_macros::dec;
    use splitledger_events::{EventHandler, ForwardingPublisher, HandlerError, NoOpPublisher};

    use super::*;
    use crate::repository::InMemoryGroupRepository;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, u64)>>,
    }

    impl EventHandler<LedgerEnvelope> for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn handle(&self, message: &LedgerEnvelope) -> Result<(), HandlerError> {
            self.seen
                .lock()
                .map_err(|_| HandlerError::new("recorder", "poisoned"))?
                .push((message.event_type().to_string(), message.sequence_number()));
            Ok(())
        }
    }

    fn service() -> LedgerService<InMemoryGroupRepository, NoOpPublisher> {
        LedgerService::new(InMemoryGroupRepository::new(), NoOpPublisher)
    }

    #[test]
    fn create_group_rejects_taken_names() {
        let svc = service();
        svc.create_group("Flat", "a@example.com").unwrap();

        let err = svc.create_group("  Flat ", "b@example.com").unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(svc.list_groups().unwrap().len(), 1);
    }

    #[test]
    fn create_group_validates_input() {
        let svc = service();
        assert_eq!(svc.create_group("", "a@example.com").unwrap_err().code(), "VALIDATION_ERROR");
        assert_eq!(svc.create_group("Flat", "nope").unwrap_err().code(), "VALIDATION_ERROR");
        assert!(svc.list_groups().unwrap().is_empty());
    }

    #[test]
    fn unknown_group_is_not_found() {
        let svc = service();
        let id = GroupId::new();
        assert_eq!(svc.add_participant(id, "a@example.com").unwrap_err().code(), "NOT_FOUND");
        assert_eq!(svc.get_balances(id).unwrap_err().code(), "NOT_FOUND");
        assert_eq!(svc.expense_history(id, 0, None).unwrap_err().code(), "NOT_FOUND");
    }

    #[test]
    fn failed_operation_does_not_bump_the_stored_version() {
        let svc = service();
        let group_id = svc.create_group("Flat", "a@example.com").unwrap();

        let err = svc.activate_group(group_id).unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");
        assert_eq!(svc.repository().load(group_id).unwrap().version(), 1);
    }

    #[test]
    fn oversized_settlements_are_validation_errors_and_leave_the_group_usable() {
        let svc = service();
        let group_id = svc.create_group("Flat", "a@example.com").unwrap();
        let b = svc.add_participant(group_id, "b@example.com").unwrap();
        let a = svc.get_balances(group_id).unwrap()[0].participant_id;

        assert_eq!(svc.settle(group_id, a, b, Decimal::MAX).unwrap_err().code(), "VALIDATION_ERROR");

        svc.settle(group_id, a, b, splitledger_ledger::MAX_AMOUNT).unwrap();
        let err = svc.settle(group_id, a, b, splitledger_ledger::MAX_AMOUNT).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        svc.settle(group_id, b, a, dec!(1)).unwrap();
        let balances = svc.get_balances(group_id).unwrap();
        assert_eq!(
            balances[0].balance.amount(),
            splitledger_ledger::MAX_AMOUNT - dec!(1)
        );
        assert_eq!(svc.repository().load(group_id).unwrap().version(), 4);
    }

    #[test]
    fn negative_amounts_fail_before_touching_the_store() {
        let svc = service();
        let group_id = svc.create_group("Flat", "a@example.com").unwrap();
        let payer = svc.get_balances(group_id).unwrap()[0].participant_id;

        let err = svc
            .record_activity(group_id, "Rent", dec!(-1), payer, None)
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(svc.get_group(group_id).unwrap().participants[0].balance.is_zero());
    }

    #[test]
    fn events_are_published_with_group_sequence_numbers() {
        let recorder = Arc::new(Recorder::default());
        let handlers: Vec<Arc<dyn EventHandler<LedgerEnvelope>>> = vec![recorder.clone()];
        let svc = LedgerService::new(InMemoryGroupRepository::new(), ForwardingPublisher::new(handlers));

        let group_id = svc.create_group("Flat", "a@example.com").unwrap();
        let b = svc.add_participant(group_id, "b@example.com").unwrap();
        svc.activate_group(group_id).unwrap();
        svc.record_activity(group_id, "Rent", dec!(900), b, None).unwrap();

        let seen = recorder.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ("ledger.group.created".to_string(), 1),
                ("ledger.group.participant_added".to_string(), 2),
                ("ledger.group.activated".to_string(), 3),
                ("ledger.group.expense_recorded".to_string(), 4),
            ]
        );
    }

    #[test]
    fn rejected_commands_publish_nothing() {
        let recorder = Arc::new(Recorder::default());
        let handlers: Vec<Arc<dyn EventHandler<LedgerEnvelope>>> = vec![recorder.clone()];
        let svc = LedgerService::new(InMemoryGroupRepository::new(), ForwardingPublisher::new(handlers));

        let group_id = svc.create_group("Flat", "a@example.com").unwrap();
        let _ = svc.add_participant(group_id, "A@example.com");
        let _ = svc.activate_group(group_id);

        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn expense_history_enforces_page_size_bounds() {
        let svc = LedgerService::with_config(
            InMemoryGroupRepository::new(),
            NoOpPublisher,
            LedgerConfig {
                max_page_size: 10,
                default_page_size: 2,
            },
        );
        let group_id = svc.create_group("Flat", "a@example.com").unwrap();

        assert_eq!(
            svc.expense_history(group_id, 0, Some(0)).unwrap_err().code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            svc.expense_history(group_id, 0, Some(11)).unwrap_err().code(),
            "VALIDATION_ERROR"
        );
        let page = svc.expense_history(group_id, 0, None).unwrap();
        assert_eq!(page.size, 2);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}
