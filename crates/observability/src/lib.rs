//! Process-wide logging setup for the ledger binaries.
//!
//! Library crates only emit `tracing` events; this crate decides where they go.

pub mod tracing;

pub use self::tracing::{LogFormat, ParseLogFormatError, TracingConfig, init_with};

/// Install the global subscriber using `SPLITLEDGER_LOG` and
/// `SPLITLEDGER_LOG_FORMAT`. Later calls do nothing.
pub fn init() {
    tracing::init();
}
