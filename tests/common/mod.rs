#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use savings_ledger::clock::ManualClock;
use savings_ledger::events::MemoryEventSink;
use savings_ledger::transfer::PayoutLog;
use savings_ledger::{Config, LedgerService, Money};

pub type TestLedger = LedgerService<Arc<ManualClock>, PayoutLog, MemoryEventSink>;

pub struct Fixture {
    pub ledger: Arc<TestLedger>,
    pub clock: Arc<ManualClock>,
    pub events: Arc<MemoryEventSink>,
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
}

pub fn setup() -> Fixture {
    setup_with(Config::default())
}

pub fn setup_with(config: Config) -> Fixture {
    let clock = Arc::new(ManualClock::new(start()));
    let events = Arc::new(MemoryEventSink::new());
    let ledger = Arc::new(LedgerService::new(
        config,
        clock.clone(),
        PayoutLog::new(),
        events.clone(),
    ));
    Fixture {
        ledger,
        clock,
        events,
    }
}

/// Whole units, e.g. `units(1)` is one ether-equivalent.
pub fn units(n: i64) -> Money {
    Money(n * Money::SCALE)
}

pub fn sum_of_balances(ledger: &TestLedger) -> Money {
    Money(
        ledger
            .accounts()
            .iter()
            .map(|(_, account)| account.balance().as_minor())
            .sum(),
    )
}
