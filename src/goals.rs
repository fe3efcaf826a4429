use std::sync::Arc;

use crate::domain::{EventSink, LedgerEvent};
use crate::store::AccountEntry;

/// Decides when a savings goal has been reached.
///
/// Achievement unlocks the goal even if the owner locked it, and raises a
/// single `GoalAchieved` event per goal. Deadlines are advisory and never
/// expire a goal here.
#[derive(Debug)]
pub struct GoalTracker<E> {
    events: Arc<E>,
}

impl<E: EventSink> GoalTracker<E> {
    pub fn new(events: Arc<E>) -> Self {
        Self { events }
    }

    /// Unlocks a met goal on every call. Returns `true` only for the call that
    /// first observed the goal being reached.
    pub fn evaluate(&self, entry: &mut AccountEntry<'_>) -> bool {
        let account = entry.id();
        let balance = entry.balance();
        let Some(goal) = entry.goal_mut() else {
            return false;
        };
        if !goal.is_met_by(balance) {
            return false;
        }
        goal.locked = false;
        if goal.achieved {
            return false;
        }

        goal.achieved = true;
        let target_amount = goal.target_amount;

        tracing::info!(%account, %target_amount, %balance, "savings goal achieved");
        self.events.emit(&LedgerEvent::GoalAchieved {
            account,
            target_amount,
            balance,
        });
        true
    }
}
