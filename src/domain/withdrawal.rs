use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalRequest {
    pub amount: Money,
    pub requested_at: DateTime<Utc>,
    pub unlock_time: DateTime<Utc>,
    pub executed: bool,
}

/// Position of an account in the withdrawal time-lock state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalState {
    NoRequest,
    Pending,
    Executed,
}

impl WithdrawalState {
    pub fn of(request: Option<&WithdrawalRequest>) -> Self {
        match request {
            None => WithdrawalState::NoRequest,
            Some(r) if r.executed => WithdrawalState::Executed,
            Some(_) => WithdrawalState::Pending,
        }
    }

    /// Whether a fresh request may be recorded from this state.
    pub fn accepts_request(&self) -> bool {
        !matches!(self, WithdrawalState::Pending)
    }
}

impl WithdrawalRequest {
    pub fn is_unlocked_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.unlock_time
    }
}
