use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::domain::{Error, Money};

/// Process-wide aggregates. Updated with atomics from inside the owning
/// account's critical section so unrelated accounts never share a lock.
#[derive(Debug, Default)]
pub struct LedgerStatistics {
    total_balance: AtomicI64,
    total_accounts_ever_funded: AtomicU64,
    total_withdrawals_executed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub total_balance: Money,
    pub total_funded_accounts: u64,
    pub total_executed_withdrawals: u64,
}

impl LedgerStatistics {
    /// Adds `amount` to the total, refusing when the total would overflow.
    pub(crate) fn try_credit(&self, amount: Money) -> Result<(), Error> {
        self.total_balance
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |total| {
                total.checked_add(amount.as_minor())
            })
            .map(|_| ())
            .map_err(|_| Error::InvalidAmount(amount))
    }

    pub(crate) fn debit(&self, amount: Money) {
        self.total_balance.fetch_sub(amount.as_minor(), Ordering::SeqCst);
    }

    pub(crate) fn record_funded_account(&self) {
        self.total_accounts_ever_funded.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_withdrawal(&self) {
        self.total_withdrawals_executed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            total_balance: Money(self.total_balance.load(Ordering::SeqCst)),
            total_funded_accounts: self.total_accounts_ever_funded.load(Ordering::SeqCst),
            total_executed_withdrawals: self.total_withdrawals_executed.load(Ordering::SeqCst),
        }
    }
}
