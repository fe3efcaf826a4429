use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::domain::{
    Account, AccountId, Clock, Error, EventSink, LedgerEvent, Money, SavingsGoal, ValueTransfer,
    WithdrawalRequest,
};
use crate::goals::GoalTracker;
use crate::scheduler::WithdrawalScheduler;
use crate::statistics::StatisticsSnapshot;
use crate::store::{AccountStore, check_partner};

/// Savings ledger: deposits, goals, partners and time-locked withdrawals.
///
/// Every mutating operation runs behind [`LedgerService::guarded`], which holds
/// the emergency-stop read guard for the whole operation. Toggling the stop
/// takes the write guard, so no operation straddles a flip of the flag.
/// The `account` argument of a mutating operation is the authenticated caller.
#[derive(Debug)]
pub struct LedgerService<C, T, E>
where
    C: Clock,
    T: ValueTransfer,
    E: EventSink,
{
    config: Config,
    store: AccountStore,
    scheduler: WithdrawalScheduler,
    goals: GoalTracker<E>,
    clock: C,
    transfer: T,
    events: Arc<E>,
    emergency_stop: RwLock<bool>,
}

impl<C, T, E> LedgerService<C, T, E>
where
    C: Clock,
    T: ValueTransfer,
    E: EventSink,
{
    pub fn new(config: Config, clock: C, transfer: T, events: Arc<E>) -> Self {
        Self {
            scheduler: WithdrawalScheduler::new(config.withdrawal_delay),
            goals: GoalTracker::new(events.clone()),
            config,
            store: AccountStore::new(),
            clock,
            transfer,
            events,
            emergency_stop: RwLock::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    fn guarded<R, F>(&self, operation: &'static str, account: AccountId, f: F) -> Result<R, Error>
    where
        F: FnOnce() -> Result<R, Error>,
    {
        let _span = tracing::debug_span!("ledger", operation, %account).entered();
        let stopped = self
            .emergency_stop
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return Err(Error::EmergencyStopActive);
        }
        let result = f();
        if let Err(error) = &result {
            tracing::debug!(%error, "rejected");
        }
        result
    }

    /// Credits `amount` and returns the new balance.
    pub fn deposit(&self, account: AccountId, amount: Money) -> Result<Money, Error> {
        self.guarded("deposit", account, || {
            if !amount.is_positive() {
                return Err(Error::InvalidAmount(amount));
            }
            self.store.with_account(account, |entry| {
                let balance = entry.add_balance(amount)?;
                if entry.mark_funded() {
                    tracing::debug!("first funding");
                }
                tracing::debug!(%amount, %balance, "deposited");
                self.events.emit(&LedgerEvent::Deposited {
                    account,
                    amount,
                    balance,
                });
                self.goals.evaluate(entry);
                Ok(balance)
            })
        })
    }

    /// Opens a withdrawal request and returns its unlock time.
    pub fn request_withdrawal(
        &self,
        account: AccountId,
        amount: Money,
    ) -> Result<DateTime<Utc>, Error> {
        self.guarded("request_withdrawal", account, || {
            if !amount.is_positive() {
                return Err(Error::InvalidAmount(amount));
            }
            let now = self.clock.now();
            let unfunded = || Error::InsufficientBalance {
                required: amount,
                available: Money::zero(),
            };
            let request = self.store.with_existing_account(account, unfunded, |entry| {
                self.scheduler.request(entry, amount, now)
            })?;
            tracing::debug!(%amount, unlock_time = %request.unlock_time, "withdrawal requested");
            self.events.emit(&LedgerEvent::WithdrawalRequested {
                account,
                amount,
                unlock_time: request.unlock_time,
            });
            Ok(request.unlock_time)
        })
    }

    /// Executes the pending request once its time lock has expired.
    pub fn execute_withdrawal(&self, account: AccountId) -> Result<Money, Error> {
        self.guarded("execute_withdrawal", account, || {
            let now = self.clock.now();
            let amount = self.store.with_existing_account(
                account,
                || Error::NoRequest(account),
                |entry| self.scheduler.execute(entry, now, &self.transfer),
            )?;
            tracing::info!(%account, %amount, "withdrawal executed");
            self.events.emit(&LedgerEvent::Withdrawn { account, amount });
            Ok(amount)
        })
    }

    /// Sets (or replaces) the account's savings goal.
    pub fn set_goal(
        &self,
        account: AccountId,
        target_amount: Money,
        deadline: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Result<SavingsGoal, Error> {
        let description = description.into();
        self.guarded("set_goal", account, || {
            let minimum = self.config.min_goal_target;
            if target_amount < minimum {
                return Err(Error::TargetTooLow {
                    target: target_amount,
                    minimum,
                });
            }
            if deadline <= self.clock.now() {
                return Err(Error::DeadlineInPast { deadline });
            }

            let goal = SavingsGoal::new(target_amount, deadline, description);
            self.store.with_account(account, |entry| {
                entry.set_goal(goal.clone());
                Ok(())
            })?;
            self.events.emit(&LedgerEvent::GoalSet {
                account,
                target_amount,
                deadline,
            });
            Ok(goal)
        })
    }

    pub fn lock_goal(&self, account: AccountId) -> Result<(), Error> {
        self.guarded("lock_goal", account, || {
            self.store.with_existing_account(
                account,
                || Error::NoGoalSet(account),
                |entry| entry.lock_goal(),
            )?;
            self.events.emit(&LedgerEvent::GoalLocked { account });
            Ok(())
        })
    }

    /// Grants `partner` read access to `account`'s goal. One-directional.
    pub fn add_partner(&self, account: AccountId, partner: AccountId) -> Result<(), Error> {
        self.guarded("add_partner", account, || {
            check_partner(account, partner)?;
            self.store
                .with_account(account, |entry| entry.add_partner(partner))?;
            self.events
                .emit(&LedgerEvent::PartnerAdded { account, partner });
            Ok(())
        })
    }

    pub fn get_balance(&self, account: AccountId) -> Money {
        self.store.get_balance(account)
    }

    /// Visible to the owner and its partners.
    pub fn get_goal(
        &self,
        account: AccountId,
        caller: AccountId,
    ) -> Result<Option<SavingsGoal>, Error> {
        if caller == account {
            return Ok(self.store.get_goal(account));
        }
        self.store
            .read_account(account, |a| {
                if a.is_partner(&caller) {
                    Ok(a.goal().cloned())
                } else {
                    Err(Error::Unauthorized { caller })
                }
            })
            .unwrap_or(Err(Error::Unauthorized { caller }))
    }

    /// Visible to the owner only.
    pub fn get_withdrawal_request(
        &self,
        account: AccountId,
        caller: AccountId,
    ) -> Result<Option<WithdrawalRequest>, Error> {
        if caller != account {
            return Err(Error::Unauthorized { caller });
        }
        Ok(self.store.get_pending_withdrawal(account))
    }

    pub fn statistics(&self) -> StatisticsSnapshot {
        self.store.statistics()
    }

    pub fn funded_accounts(&self) -> Vec<AccountId> {
        self.store.funded_accounts()
    }

    pub fn accounts(&self) -> Vec<(AccountId, Account)> {
        self.store.snapshot()
    }

    pub fn is_emergency_stopped(&self) -> bool {
        *self
            .emergency_stop
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Flips the global circuit breaker. Administrator only.
    pub fn toggle_emergency_stop(&self, caller: AccountId) -> Result<bool, Error> {
        if caller != self.config.administrator {
            return Err(Error::Unauthorized { caller });
        }
        let active = {
            let mut stopped = self
                .emergency_stop
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *stopped = !*stopped;
            *stopped
        };
        tracing::info!(active, "emergency stop toggled");
        self.events
            .emit(&LedgerEvent::EmergencyStopToggled { active });
        Ok(active)
    }
}
