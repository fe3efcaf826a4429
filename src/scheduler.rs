use chrono::{DateTime, Duration, Utc};

use crate::domain::{Error, Money, ValueTransfer, WithdrawalRequest, WithdrawalState};
use crate::store::AccountEntry;

/// Time-locked withdrawal state machine.
///
/// `NoRequest -> Pending` on request, `Pending -> Executed` once the delay has
/// elapsed. An executed request may be replaced by a new one. There is no
/// cancellation, and a request does not reserve funds: the balance is checked
/// again at execution.
#[derive(Debug, Clone)]
pub struct WithdrawalScheduler {
    delay: Duration,
}

impl WithdrawalScheduler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn request(
        &self,
        entry: &mut AccountEntry<'_>,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<WithdrawalRequest, Error> {
        if !amount.is_positive() {
            return Err(Error::InvalidAmount(amount));
        }
        if entry.withdrawal_state() == WithdrawalState::Pending {
            return Err(Error::RequestAlreadyExists(entry.id()));
        }
        if let Some(goal) = entry.goal() {
            if goal.blocks_withdrawal(now) {
                return Err(Error::GoalLocked {
                    deadline: goal.deadline,
                });
            }
        }
        let available = entry.balance();
        if amount > available {
            return Err(Error::InsufficientBalance {
                required: amount,
                available,
            });
        }

        let request = WithdrawalRequest {
            amount,
            requested_at: now,
            unlock_time: now + self.delay,
            executed: false,
        };
        entry.set_pending_withdrawal(request.clone())?;
        Ok(request)
    }

    /// Executes the pending request. The transfer happens before any ledger
    /// mutation so a rejected transfer leaves the account untouched.
    pub fn execute<T: ValueTransfer>(
        &self,
        entry: &mut AccountEntry<'_>,
        now: DateTime<Utc>,
        transfer: &T,
    ) -> Result<Money, Error> {
        let id = entry.id();
        let request = entry.pending_withdrawal().ok_or(Error::NoRequest(id))?;
        if request.executed {
            return Err(Error::AlreadyExecuted(id));
        }
        if !request.is_unlocked_at(now) {
            return Err(Error::TimeLockNotExpired {
                unlock_time: request.unlock_time,
            });
        }
        let amount = request.amount;
        let available = entry.balance();
        if amount > available {
            return Err(Error::InsufficientBalance {
                required: amount,
                available,
            });
        }

        transfer.transfer(id, amount)?;

        entry.subtract_balance(amount)?;
        entry.mark_withdrawal_executed()?;
        Ok(amount)
    }
}
