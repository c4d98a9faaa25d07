//! Ledger event mechanics: the event contract, envelopes, handlers and publishers.

pub mod envelope;
pub mod event;
pub mod handler;
pub mod publisher;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::{EventHandler, HandlerError, execute};
pub use publisher::{EventPublisher, ForwardingPublisher, NoOpPublisher, PublishReport};
