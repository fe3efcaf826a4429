use std::{env, fs::File, io, path::Path, sync::Arc};

use savings_ledger::clock::ManualClock;
use savings_ledger::dlq::TracingDLQ;
use savings_ledger::engine::Engine;
use savings_ledger::events::TracingEventSink;
use savings_ledger::ingestion::CsvReader;
use savings_ledger::transfer::PayoutLog;
use savings_ledger::{Config, LedgerService, report};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "savings_ledger=info".into()),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main] // using Tokio runtime for async
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let file_path = env::args()
        .nth(1)
        .ok_or("usage: savings_ledger <commands.csv>")?;
    let file = File::open(Path::new(&file_path))?;
    let config = Config::from_env()?;

    let clock = Arc::new(ManualClock::default());
    let ledger = Arc::new(LedgerService::new(
        config,
        clock.clone(),
        PayoutLog::new(),
        Arc::new(TracingEventSink::default()),
    ));

    let mut engine = Engine::new(CsvReader::new(file)?, clock, ledger, TracingDLQ::default());
    engine.process().await?;

    report::write_summary(&engine.ledger().accounts(), io::stdout().lock())?;

    Ok(())
}
