//! Fire-and-forget publication of saved changes to registered handlers.

use std::sync::Arc;

use crate::handler::{EventHandler, HandlerError};

/// Outcome of one `publish` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Handlers that accepted the message.
    pub delivered: usize,
    /// Handlers that failed, in registration order.
    pub failures: Vec<HandlerError>,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Publishes messages to downstream consumers.
///
/// Publication never fails from the caller's point of view: every handler is
/// attempted and failures are reported, not raised.
pub trait EventPublisher<M>: Send + Sync {
    fn publish(&self, message: &M) -> PublishReport;
}

impl<M, P> EventPublisher<M> for Arc<P>
where
    P: EventPublisher<M> + ?Sized,
{
    fn publish(&self, message: &M) -> PublishReport {
        (**self).publish(message)
    }
}

/// Forwards each message to an ordered list of handlers.
///
/// A failing handler is logged and skipped; the remaining handlers still run.
pub struct ForwardingPublisher<M> {
    handlers: Vec<Arc<dyn EventHandler<M>>>,
}

impl<M> ForwardingPublisher<M> {
    pub fn new(handlers: Vec<Arc<dyn EventHandler<M>>>) -> Self {
        Self { handlers }
    }

    pub fn with_handler(mut self, handler: Arc<dyn EventHandler<M>>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<M> Default for ForwardingPublisher<M> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<M> core::fmt::Debug for ForwardingPublisher<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("ForwardingPublisher").field("handlers", &names).finish()
    }
}

impl<M> EventPublisher<M> for ForwardingPublisher<M>
where
    M: Send + Sync,
{
    fn publish(&self, message: &M) -> PublishReport {
        let mut report = PublishReport::default();
        for handler in &self.handlers {
            match handler.handle(message) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    tracing::warn!(handler = handler.name(), error = %err, "event handler failed");
                    report.failures.push(err);
                }
            }
        }
        report
    }
}

/// Publisher that drops every message. Used when nothing is subscribed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpPublisher;

impl<M> EventPublisher<M> for NoOpPublisher {
    fn publish(&self, _message: &M) -> PublishReport {
        PublishReport::default()
    }
}
