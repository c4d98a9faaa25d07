//! The `ExpenseGroup` aggregate: the consistency boundary for balances.
//!
//! Every balance change flows through a [`Posting`] carried by an event, and
//! every event that carries postings nets to zero. The sum of all balances in
//! a group is therefore zero after every operation.

use chrono::Utc;
use rust_decimal::Decimal;

use splitledger_core::{
    ActivityId, Aggregate, AggregateRoot, DomainError, DomainResult, GroupId, ParticipantId,
};
use splitledger_events::execute;

use crate::activity::{ExpenseActivity, validate_description};
use crate::command::{ActivateGroup, AddParticipant, CreateGroup, GroupCommand, RecordActivity, Settle};
use crate::email::ParticipantEmail;
use crate::event::{
    ExpenseRecorded, GroupActivated, GroupCreated, LedgerEvent, ParticipantAdded, Posting,
    PostingDirection, SettlementCompleted, ensure_balanced,
};
use crate::group_name::GroupName;
use crate::money::Money;
use crate::participant::Participant;
use crate::settlement::Settlement;
use crate::split::ExpenseSplit;

/// Members required before a group can be activated.
pub const MIN_MEMBERS_FOR_ACTIVATION: usize = 2;

/// Aggregate root: ExpenseGroup.
///
/// Participants keep join order; the creator is always first. Activities are
/// append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseGroup {
    id: GroupId,
    name: GroupName,
    creator_id: Option<ParticipantId>,
    activated: bool,
    participants: Vec<Participant>,
    activities: Vec<ExpenseActivity>,
    version: u64,
    created: bool,
    pending: Vec<LedgerEvent>,
}

impl ExpenseGroup {
    /// Empty aggregate for rehydration.
    pub fn empty(id: GroupId) -> Self {
        Self {
            id,
            name: GroupName::unset(),
            creator_id: None,
            activated: false,
            participants: Vec::new(),
            activities: Vec::new(),
            version: 0,
            created: false,
            pending: Vec::new(),
        }
    }

    /// New group whose only member is the creator. Not activated.
    pub fn create(name: &str, creator_email: &str) -> DomainResult<Self> {
        let mut group = Self::empty(GroupId::new());
        let cmd = CreateGroup {
            group_id: group.id,
            name: name.to_string(),
            creator_id: ParticipantId::new(),
            creator_email: creator_email.to_string(),
            occurred_at: Utc::now(),
        };
        group.run(GroupCommand::CreateGroup(cmd))?;
        Ok(group)
    }

    /// Rebuild a group by replaying its events in order.
    pub fn rehydrate(id: GroupId, events: &[LedgerEvent]) -> DomainResult<Self> {
        let mut group = Self::empty(id);
        for event in events {
            group.apply(event)?;
        }
        Ok(group)
    }

    pub fn add_participant(&mut self, participant: Participant) -> DomainResult<ParticipantId> {
        if !participant.balance().is_zero() {
            return Err(DomainError::invariant(
                "a participant must join a group with a zero balance",
            ));
        }
        let cmd = AddParticipant {
            participant_id: participant.id(),
            email: participant.email().as_str().to_string(),
            occurred_at: Utc::now(),
        };
        self.run(GroupCommand::AddParticipant(cmd))?;
        Ok(participant.id())
    }

    /// Fails with `InvalidState` with fewer than two members or when already active.
    pub fn activate(&mut self) -> DomainResult<()> {
        let cmd = ActivateGroup {
            occurred_at: Utc::now(),
        };
        self.run(GroupCommand::ActivateGroup(cmd))?;
        Ok(())
    }

    pub fn record_activity(
        &mut self,
        description: &str,
        amount: Money,
        paid_by: ParticipantId,
        split_with: Option<Vec<ParticipantId>>,
    ) -> DomainResult<ActivityId> {
        let cmd = RecordActivity {
            activity_id: ActivityId::new(),
            description: description.to_string(),
            amount,
            paid_by,
            split_with,
            occurred_at: Utc::now(),
        };
        let activity_id = cmd.activity_id;
        self.run(GroupCommand::RecordActivity(cmd))?;
        Ok(activity_id)
    }

    pub fn settle(&mut self, settlement: Settlement) -> DomainResult<()> {
        let cmd = Settle {
            settlement,
            occurred_at: Utc::now(),
        };
        self.run(GroupCommand::Settle(cmd))?;
        Ok(())
    }

    fn run(&mut self, command: GroupCommand) -> DomainResult<Vec<LedgerEvent>> {
        let events = execute(self, &command)?;
        self.pending.extend(events.iter().cloned());
        Ok(events)
    }

    pub fn group_id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &GroupName {
        &self.name
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn creator(&self) -> Option<&Participant> {
        self.creator_id.and_then(|id| self.participant(id))
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    pub fn activities(&self) -> &[ExpenseActivity] {
        &self.activities
    }

    /// Sum of every member's balance. Zero for any reachable state.
    pub fn total_balance(&self) -> DomainResult<Money> {
        let total = self.participants.iter().try_fold(Decimal::ZERO, |acc, p| {
            acc.checked_add(p.balance().amount())
                .ok_or_else(|| DomainError::invariant("balance total overflowed"))
        })?;
        Money::from_signed(total)
    }

    /// Events produced since the last drain, oldest first.
    pub fn pending_events(&self) -> &[LedgerEvent] {
        &self.pending
    }

    /// Drain the events produced since the last call.
    pub fn take_pending_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl AggregateRoot for ExpenseGroup {
    type Id = GroupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for ExpenseGroup {
    type Command = GroupCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            LedgerEvent::GroupCreated(e) => {
                if self.created {
                    return Err(DomainError::invalid_state("group already created"));
                }
                self.id = e.group_id;
                self.name = e.name.clone();
                self.creator_id = Some(e.creator_id);
                self.participants = vec![Participant::joined(e.creator_id, e.creator_email.clone())];
                self.created = true;
            }
            LedgerEvent::ParticipantAdded(e) => {
                if self.participant(e.participant_id).is_some() {
                    return Err(DomainError::duplicate_participant(e.participant_id.to_string()));
                }
                self.participants
                    .push(Participant::joined(e.participant_id, e.email.clone()));
            }
            LedgerEvent::GroupActivated(_) => {
                self.activated = true;
            }
            LedgerEvent::ExpenseRecorded(e) => {
                self.apply_postings(&e.postings)?;
                self.activities.push(ExpenseActivity::new(
                    e.activity_id,
                    &e.description,
                    e.amount,
                    e.paid_by,
                    e.split.clone(),
                    e.occurred_at,
                )?);
            }
            LedgerEvent::SettlementCompleted(e) => {
                self.apply_postings(&e.postings)?;
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            GroupCommand::CreateGroup(cmd) => self.handle_create(cmd),
            GroupCommand::AddParticipant(cmd) => self.handle_add_participant(cmd),
            GroupCommand::ActivateGroup(cmd) => self.handle_activate(cmd),
            GroupCommand::RecordActivity(cmd) => self.handle_record_activity(cmd),
            GroupCommand::Settle(cmd) => self.handle_settle(cmd),
        }
    }
}

impl ExpenseGroup {
    fn ensure_created(&self) -> DomainResult<()> {
        if self.created {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("group {}", self.id)))
        }
    }

    fn require_member(&self, id: ParticipantId) -> DomainResult<&Participant> {
        self.participant(id)
            .ok_or_else(|| DomainError::not_found(format!("participant {id}")))
    }

    /// Fails with `Validation` if applying `postings` would push any balance
    /// outside the money range. Each participant appears at most once.
    fn ensure_postings_fit(&self, postings: &[Posting]) -> DomainResult<()> {
        for posting in postings {
            let balance = self.require_member(posting.participant_id)?.balance();
            balance.checked_add(&posting.signed_amount()).map_err(|_| {
                DomainError::validation(format!(
                    "amount {} would take the balance of participant {} out of range",
                    posting.amount, posting.participant_id
                ))
            })?;
        }
        Ok(())
    }

    /// Postings were balance-checked when decided; replayed events are checked again.
    fn apply_postings(&mut self, postings: &[Posting]) -> DomainResult<()> {
        ensure_balanced(postings)?;
        for posting in postings {
            let participant = self
                .participants
                .iter_mut()
                .find(|p| p.id() == posting.participant_id)
                .ok_or_else(|| {
                    DomainError::not_found(format!("participant {}", posting.participant_id))
                })?;
            match posting.direction {
                PostingDirection::Credit => participant.credit(posting.amount)?,
                PostingDirection::Debit => participant.debit(posting.amount)?,
            }
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateGroup) -> DomainResult<Vec<LedgerEvent>> {
        if self.created {
            return Err(DomainError::invalid_state("group already created"));
        }
        let name = GroupName::parse(&cmd.name)?;
        let creator_email = ParticipantEmail::parse(&cmd.creator_email)?;

        Ok(vec![LedgerEvent::GroupCreated(GroupCreated {
            group_id: cmd.group_id,
            name,
            creator_id: cmd.creator_id,
            creator_email,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_participant(&self, cmd: &AddParticipant) -> DomainResult<Vec<LedgerEvent>> {
        self.ensure_created()?;
        let email = ParticipantEmail::parse(&cmd.email)?;

        if self.participant(cmd.participant_id).is_some() {
            return Err(DomainError::duplicate_participant(format!(
                "participant {} is already a member",
                cmd.participant_id
            )));
        }
        // Emails are stored lower-cased, so this comparison is case-insensitive.
        if self.participants.iter().any(|p| p.email() == &email) {
            return Err(DomainError::duplicate_participant(format!(
                "{email} is already a member"
            )));
        }

        Ok(vec![LedgerEvent::ParticipantAdded(ParticipantAdded {
            group_id: self.id,
            participant_id: cmd.participant_id,
            email,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_activate(&self, cmd: &ActivateGroup) -> DomainResult<Vec<LedgerEvent>> {
        self.ensure_created()?;
        if self.activated {
            return Err(DomainError::invalid_state("group is already activated"));
        }
        if self.participants.len() < MIN_MEMBERS_FOR_ACTIVATION {
            return Err(DomainError::invalid_state(format!(
                "a group needs at least {MIN_MEMBERS_FOR_ACTIVATION} members to be activated"
            )));
        }
        Ok(vec![LedgerEvent::GroupActivated(GroupActivated {
            group_id: self.id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_activity(&self, cmd: &RecordActivity) -> DomainResult<Vec<LedgerEvent>> {
        self.ensure_created()?;
        let description = validate_description(&cmd.description)?;
        if cmd.amount.is_non_positive() {
            return Err(DomainError::validation("expense amount must be positive and non-zero"));
        }
        let payer = self.require_member(cmd.paid_by)?.id();

        let split = match cmd.split_with.as_deref() {
            None | Some([]) => ExpenseSplit::Even,
            Some(ids) => {
                for id in ids {
                    self.require_member(*id)?;
                }
                ExpenseSplit::custom_with_payer(ids.iter().copied(), payer)
            }
        };

        let postings = self.split_postings(cmd.amount, payer, &split)?;
        ensure_balanced(&postings)?;
        self.ensure_postings_fit(&postings)?;

        Ok(vec![LedgerEvent::ExpenseRecorded(ExpenseRecorded {
            group_id: self.id,
            activity_id: cmd.activity_id,
            description,
            amount: cmd.amount,
            paid_by: payer,
            split,
            postings,
            occurred_at: cmd.occurred_at,
        })])
    }

    /// Debit every non-payer share and credit the payer with their sum.
    ///
    /// Shares are `amount / N` truncated to the cent. Leftover cents go one
    /// each to the first members of the split, in join order. Zero shares
    /// produce no posting.
    fn split_postings(
        &self,
        amount: Money,
        payer: ParticipantId,
        split: &ExpenseSplit,
    ) -> DomainResult<Vec<Posting>> {
        let members: Vec<ParticipantId> = self
            .participants
            .iter()
            .map(Participant::id)
            .filter(|id| split.includes(*id))
            .collect();
        let shares = amount.allocate(members.len())?;

        let mut postings: Vec<Posting> = members
            .iter()
            .zip(shares)
            .filter(|(member, share)| **member != payer && !share.is_zero())
            .map(|(member, share)| Posting::debit(*member, share))
            .collect();
        let owed_to_payer = Money::sum(postings.iter().map(|p| &p.amount))?;
        if owed_to_payer.is_positive() {
            postings.insert(0, Posting::credit(payer, owed_to_payer));
        }
        Ok(postings)
    }

    fn handle_settle(&self, cmd: &Settle) -> DomainResult<Vec<LedgerEvent>> {
        self.ensure_created()?;
        let settlement = cmd.settlement;
        let from = self.require_member(settlement.from())?.id();
        let to = self.require_member(settlement.to())?.id();

        let postings = vec![
            Posting::credit(from, settlement.amount()),
            Posting::debit(to, settlement.amount()),
        ];
        ensure_balanced(&postings)?;
        self.ensure_postings_fit(&postings)?;

        Ok(vec![LedgerEvent::SettlementCompleted(SettlementCompleted {
            group_id: self.id,
            from,
            to,
            amount: settlement.amount(),
            postings,
            occurred_at: cmd.occurred_at,
        })])
    }
}
