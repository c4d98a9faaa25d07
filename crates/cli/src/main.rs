//! `splitledger`: drive the ledger over JSON lines on stdin/stdout.
//!
//! Logs go to stderr (see `SPLITLEDGER_LOG` / `SPLITLEDGER_LOG_FORMAT`).

mod protocol;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use splitledger_events::ForwardingPublisher;
use splitledger_infra::{InMemoryGroupRepository, LedgerConfig, LedgerEnvelope, LedgerService, LoggingEventHandler};

fn main() -> anyhow::Result<()> {
    splitledger_observability::init();

    let config = LedgerConfig::from_env().context("invalid ledger configuration")?;
    let publisher: ForwardingPublisher<LedgerEnvelope> =
        ForwardingPublisher::default().with_handler(Arc::new(LoggingEventHandler::new()));
    let handlers = publisher.handler_count();
    let service = LedgerService::with_config(InMemoryGroupRepository::new(), publisher, config);
    tracing::info!(
        handlers,
        max_page_size = config.max_page_size,
        default_page_size = config.default_page_size,
        "splitledger ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read request from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = protocol::handle_line(&service, &line);
        serde_json::to_writer(&mut stdout, &response).context("failed to encode response")?;
        stdout.write_all(b"\n").context("failed to write response")?;
        stdout.flush().context("failed to flush stdout")?;
    }
    Ok(())
}
