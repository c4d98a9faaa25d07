//! Event handlers wired into the service's publisher.

use tracing::info;

use splitledger_events::{Event, EventHandler, HandlerError};
use splitledger_ledger::LedgerEvent;

use crate::service::LedgerEnvelope;

/// Logs every published ledger event at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventHandler;

impl LoggingEventHandler {
    pub fn new() -> Self {
        Self
    }
}

impl EventHandler<LedgerEnvelope> for LoggingEventHandler {
    fn name(&self) -> &str {
        "logging"
    }

    fn handle(&self, envelope: &LedgerEnvelope) -> Result<(), HandlerError> {
        let event = envelope.payload();
        let occurred_at = event.occurred_at().to_rfc3339();
        match event {
            LedgerEvent::ExpenseRecorded(e) => info!(
                event_type = envelope.event_type(),
                group_id = %envelope.group_id(),
                sequence = envelope.sequence_number(),
                activity_id = %e.activity_id,
                paid_by = %e.paid_by,
                amount = %e.amount,
                postings = e.postings.len(),
                occurred_at = %occurred_at,
                "ledger event"
            ),
            LedgerEvent::SettlementCompleted(e) => info!(
                event_type = envelope.event_type(),
                group_id = %envelope.group_id(),
                sequence = envelope.sequence_number(),
                from = %e.from,
                to = %e.to,
                amount = %e.amount,
                occurred_at = %occurred_at,
                "ledger event"
            ),
            _ => info!(
                event_type = envelope.event_type(),
                group_id = %envelope.group_id(),
                sequence = envelope.sequence_number(),
                occurred_at = %occurred_at,
                "ledger event"
            ),
        }
        Ok(())
    }
}
