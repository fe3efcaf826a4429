use std::sync::{Mutex, PoisonError};

use crate::domain::{EventSink, LedgerEvent};

/// Forwards ledger events to the `tracing` subscriber.
#[derive(Default, Debug)]
pub struct TracingEventSink {}

impl EventSink for TracingEventSink {
    fn emit(&self, event: &LedgerEvent) {
        tracing::info!(event = event.name(), details = ?event, "ledger event");
    }
}

/// Keeps events in memory, in emission order.
#[derive(Default, Debug)]
pub struct MemoryEventSink {
    events: Mutex<Vec<LedgerEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: &LedgerEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
