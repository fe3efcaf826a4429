use chrono::{DateTime, Utc};

use crate::domain::{AccountId, Money};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Deposit { amount: Money },
    RequestWithdrawal { amount: Money },
    ExecuteWithdrawal,
    SetGoal {
        target: Money,
        deadline: DateTime<Utc>,
        description: String,
    },
    LockGoal,
    AddPartner { partner: AccountId },
    ToggleEmergencyStop,
}

/// A ledger operation issued by `account` at time `at`.
#[derive(Debug, Clone)]
pub struct Command {
    pub kind: CommandKind,
    pub account: AccountId,
    pub at: DateTime<Utc>,
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            CommandKind::Deposit { amount } | CommandKind::RequestWithdrawal { amount } => {
                write!(
                    f,
                    "{:?},account={},at={},amount={}",
                    self.kind, self.account, self.at, amount
                )
            }
            _ => write!(f, "{:?},account={},at={}", self.kind, self.account, self.at),
        }
    }
}
