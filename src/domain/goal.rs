use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavingsGoal {
    pub target_amount: Money,
    pub deadline: DateTime<Utc>,
    pub description: String,
    /// Blocks new withdrawal requests until the goal is met or the deadline passes.
    pub locked: bool,
    /// Set once the achievement signal has been raised for this goal.
    pub achieved: bool,
}

impl SavingsGoal {
    pub fn new(target_amount: Money, deadline: DateTime<Utc>, description: String) -> Self {
        Self {
            target_amount,
            deadline,
            description,
            locked: false,
            achieved: false,
        }
    }

    pub fn is_met_by(&self, balance: Money) -> bool {
        self.target_amount.is_positive() && balance >= self.target_amount
    }

    pub fn blocks_withdrawal(&self, now: DateTime<Utc>) -> bool {
        self.locked && now < self.deadline
    }
}
