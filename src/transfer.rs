use std::sync::{Mutex, PoisonError};

use crate::domain::{AccountId, Error, Money, ValueTransfer};

/// Records every payout instead of moving real value.
#[derive(Default, Debug)]
pub struct PayoutLog {
    payouts: Mutex<Vec<(AccountId, Money)>>,
}

impl PayoutLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payouts(&self) -> Vec<(AccountId, Money)> {
        self.payouts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn total_paid(&self, account: AccountId) -> Money {
        Money(
            self.payouts()
                .iter()
                .filter(|(to, _)| *to == account)
                .map(|(_, amount)| amount.as_minor())
                .sum(),
        )
    }
}

impl ValueTransfer for PayoutLog {
    fn transfer(&self, to: AccountId, amount: Money) -> Result<(), Error> {
        tracing::info!(account = %to, %amount, "payout");
        self.payouts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((to, amount));
        Ok(())
    }
}
