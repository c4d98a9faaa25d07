use chrono::{DateTime, Utc};

use splitledger_core::{ActivityId, GroupId, ParticipantId};

use crate::money::Money;
use crate::settlement::Settlement;

/// Command: CreateGroup. The creator becomes the first participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroup {
    pub group_id: GroupId,
    pub name: String,
    pub creator_id: ParticipantId,
    pub creator_email: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddParticipant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddParticipant {
    pub participant_id: ParticipantId,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ActivateGroup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateGroup {
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordActivity.
///
/// `split_with` of `None` (or an empty list) splits evenly across every
/// current member; otherwise across the listed members plus the payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordActivity {
    pub activity_id: ActivityId,
    pub description: String,
    pub amount: Money,
    pub paid_by: ParticipantId,
    pub split_with: Option<Vec<ParticipantId>>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settle {
    pub settlement: Settlement,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupCommand {
    CreateGroup(CreateGroup),
    AddParticipant(AddParticipant),
    ActivateGroup(ActivateGroup),
    RecordActivity(RecordActivity),
    Settle(Settle),
}
