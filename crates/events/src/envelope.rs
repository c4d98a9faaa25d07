use serde::{Deserialize, Serialize};
use uuid::Uuid;

use splitledger_core::GroupId;

/// Envelope for an event published after a group was saved.
///
/// `sequence_number` is the group version reached by applying `payload`, so
/// consumers can drop duplicates with a per-group high-water mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    group_id: GroupId,
    event_type: String,

    /// Monotonically increasing position in the group's history.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        group_id: GroupId,
        event_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            group_id,
            event_type: event_type.into(),
            sequence_number,
            payload,
        }
    }

    /// Wrap a typed event, taking its type name from the `Event` impl.
    pub fn wrap(group_id: GroupId, sequence_number: u64, payload: E) -> Self
    where
        E: crate::Event,
    {
        let event_type = payload.event_type();
        Self::new(Uuid::now_v7(), group_id, event_type, sequence_number, payload)
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
