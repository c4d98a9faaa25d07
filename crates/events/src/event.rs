use chrono::{DateTime, Utc};

/// Something that happened to a group, recorded after the fact.
///
/// Payloads are cloned once per handler and once per bus subscription, so
/// they should stay plain data.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, stable across releases: `ledger.group.expense_recorded`.
    fn event_type(&self) -> &'static str;

    /// Payload schema revision. Bump when a field changes meaning.
    fn version(&self) -> u32 {
        1
    }

    /// Wall-clock time the fact was recorded.
    fn occurred_at(&self) -> DateTime<Utc>;
}
