use chrono::{DateTime, Utc};

use crate::domain::{AccountId, Money};

/// Notifications raised by the ledger; delivered through an `EventSink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Deposited {
        account: AccountId,
        amount: Money,
        balance: Money,
    },
    WithdrawalRequested {
        account: AccountId,
        amount: Money,
        unlock_time: DateTime<Utc>,
    },
    Withdrawn {
        account: AccountId,
        amount: Money,
    },
    GoalSet {
        account: AccountId,
        target_amount: Money,
        deadline: DateTime<Utc>,
    },
    GoalLocked {
        account: AccountId,
    },
    GoalAchieved {
        account: AccountId,
        target_amount: Money,
        balance: Money,
    },
    PartnerAdded {
        account: AccountId,
        partner: AccountId,
    },
    EmergencyStopToggled {
        active: bool,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::Deposited { .. } => "deposited",
            LedgerEvent::WithdrawalRequested { .. } => "withdrawal_requested",
            LedgerEvent::Withdrawn { .. } => "withdrawn",
            LedgerEvent::GoalSet { .. } => "goal_set",
            LedgerEvent::GoalLocked { .. } => "goal_locked",
            LedgerEvent::GoalAchieved { .. } => "goal_achieved",
            LedgerEvent::PartnerAdded { .. } => "partner_added",
            LedgerEvent::EmergencyStopToggled { .. } => "emergency_stop_toggled",
        }
    }
}
