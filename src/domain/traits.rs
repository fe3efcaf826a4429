use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::Stream;

use crate::domain::{AccountId, Command, Error, LedgerEvent, Money};

pub trait CommandStream {
    type CmdStream: Stream<Item = Result<Command, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::CmdStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// Source of the current time for time-lock and deadline checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Moves value out of the ledger to the account holder.
pub trait ValueTransfer: Send + Sync {
    fn transfer(&self, to: AccountId, amount: Money) -> Result<(), Error>;
}

impl<T: ValueTransfer + ?Sized> ValueTransfer for Arc<T> {
    fn transfer(&self, to: AccountId, amount: Money) -> Result<(), Error> {
        (**self).transfer(to, amount)
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &LedgerEvent);
}

impl<E: EventSink + ?Sized> EventSink for Arc<E> {
    fn emit(&self, event: &LedgerEvent) {
        (**self).emit(event)
    }
}
