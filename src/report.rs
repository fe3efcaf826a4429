use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Account, AccountId, Error, Money};

#[derive(Debug, Serialize)]
struct SummaryRow {
    account: AccountId,
    balance: Money,
    goal_target: Option<Money>,
    goal_locked: Option<bool>,
    pending_amount: Option<Money>,
    pending_unlock: Option<DateTime<Utc>>,
    pending_executed: Option<bool>,
    partners: String,
}

impl SummaryRow {
    fn new(id: AccountId, account: &Account) -> Self {
        let goal = account.goal();
        let pending = account.pending_withdrawal();
        Self {
            account: id,
            balance: account.balance(),
            goal_target: goal.map(|g| g.target_amount),
            goal_locked: goal.map(|g| g.locked),
            pending_amount: pending.map(|p| p.amount),
            pending_unlock: pending.map(|p| p.unlock_time),
            pending_executed: pending.map(|p| p.executed),
            partners: account
                .partners()
                .iter()
                .map(AccountId::to_string)
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// Writes one CSV row per account, in the order given.
pub fn write_summary<W: Write>(accounts: &[(AccountId, Account)], writer: W) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (id, account) in accounts {
        wtr.serialize(SummaryRow::new(*id, account))
            .map_err(|e| Error::Ingestion(format!("CSV serialization error: {}", e)))?;
    }
    wtr.flush()?;
    Ok(())
}
