use splitledger_core::Aggregate;
use thiserror::Error;

/// Failure reported by an event handler.
///
/// Handler failures are observational: they are logged by the publisher and
/// never undo the change that produced the event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("handler `{handler}` failed: {message}")]
pub struct HandlerError {
    pub handler: String,
    pub message: String,
}

impl HandlerError {
    pub fn new(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            message: message.into(),
        }
    }
}

/// Reacts to a published message (notifications, read models, audit logs).
pub trait EventHandler<M>: Send + Sync {
    /// Short stable name used in logs.
    fn name(&self) -> &str;

    fn handle(&self, message: &M) -> Result<(), HandlerError>;
}

/// Execute a command against an aggregate: decide, then evolve.
///
/// Events are applied to a copy of the aggregate. The original is replaced
/// only once every event applied cleanly, so a failing command leaves it
/// untouched.
///
/// Returns the applied events in order.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: Aggregate + Clone,
{
    let events = aggregate.handle(command)?;
    let mut next = aggregate.clone();
    for ev in &events {
        next.apply(ev)?;
    }
    *aggregate = next;
    Ok(events)
}
