use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::domain::{
    Account, AccountId, Error, Money, SavingsGoal, WithdrawalRequest, WithdrawalState,
};
use crate::statistics::{LedgerStatistics, StatisticsSnapshot};

/// Account records keyed by id, plus the aggregates derived from them.
///
/// Every mutation runs inside [`AccountStore::with_account`], which holds that
/// account's mutex for the whole closure. The map lock is only held long
/// enough to look up or insert the account handle.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: RwLock<HashMap<AccountId, Arc<Mutex<Account>>>>,
    funded: Mutex<Vec<AccountId>>,
    stats: LedgerStatistics,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: AccountId) -> Option<Arc<Mutex<Account>>> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts.get(&id).cloned()
    }

    fn get_or_create(&self, id: AccountId) -> Arc<Mutex<Account>> {
        if let Some(handle) = self.handle(id) {
            return handle;
        }
        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        accounts
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(Account::new())))
            .clone()
    }

    /// Runs `f` with exclusive access to the account, creating the record on first use.
    pub fn with_account<T, F>(&self, id: AccountId, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut AccountEntry<'_>) -> Result<T, Error>,
    {
        let handle = self.get_or_create(id);
        let mut account = handle.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entry = AccountEntry {
            id,
            account: &mut *account,
            store: self,
        };
        f(&mut entry)
    }

    /// Like [`AccountStore::with_account`], but fails with `missing()` when the
    /// account has never been created.
    pub fn with_existing_account<T, M, F>(&self, id: AccountId, missing: M, f: F) -> Result<T, Error>
    where
        M: FnOnce() -> Error,
        F: FnOnce(&mut AccountEntry<'_>) -> Result<T, Error>,
    {
        let handle = self.handle(id).ok_or_else(missing)?;
        let mut account = handle.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entry = AccountEntry {
            id,
            account: &mut *account,
            store: self,
        };
        f(&mut entry)
    }

    /// Runs `f` against a consistent view of the account without creating it.
    pub fn read_account<T, F>(&self, id: AccountId, f: F) -> Option<T>
    where
        F: FnOnce(&Account) -> T,
    {
        let handle = self.handle(id)?;
        let account = handle.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&account))
    }

    pub fn get_balance(&self, id: AccountId) -> Money {
        self.read_account(id, Account::balance).unwrap_or_default()
    }

    pub fn add_balance(&self, id: AccountId, amount: Money) -> Result<Money, Error> {
        if !amount.is_positive() {
            return Err(Error::InvalidAmount(amount));
        }
        self.with_account(id, |entry| entry.add_balance(amount))
    }

    pub fn subtract_balance(&self, id: AccountId, amount: Money) -> Result<Money, Error> {
        self.with_account(id, |entry| entry.subtract_balance(amount))
    }

    pub fn get_goal(&self, id: AccountId) -> Option<SavingsGoal> {
        self.read_account(id, |a| a.goal().cloned()).flatten()
    }

    pub fn set_goal(&self, id: AccountId, goal: SavingsGoal) -> Result<(), Error> {
        self.with_account(id, |entry| {
            entry.set_goal(goal);
            Ok(())
        })
    }

    pub fn lock_goal(&self, id: AccountId) -> Result<(), Error> {
        self.with_account(id, |entry| entry.lock_goal())
    }

    pub fn unlock_goal(&self, id: AccountId) -> Result<(), Error> {
        self.with_account(id, |entry| entry.unlock_goal())
    }

    pub fn get_pending_withdrawal(&self, id: AccountId) -> Option<WithdrawalRequest> {
        self.read_account(id, |a| a.pending_withdrawal().cloned())
            .flatten()
    }

    pub fn set_pending_withdrawal(
        &self,
        id: AccountId,
        request: WithdrawalRequest,
    ) -> Result<(), Error> {
        self.with_account(id, |entry| entry.set_pending_withdrawal(request))
    }

    pub fn clear_pending_withdrawal(&self, id: AccountId) -> Result<(), Error> {
        self.with_account(id, |entry| {
            entry.clear_pending_withdrawal();
            Ok(())
        })
    }

    pub fn partners(&self, id: AccountId) -> Vec<AccountId> {
        self.read_account(id, |a| a.partners().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Append-only list of accounts whose balance has ever left zero, in funding order.
    pub fn funded_accounts(&self) -> Vec<AccountId> {
        self.funded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Copy of every account, sorted by id.
    pub fn snapshot(&self) -> Vec<(AccountId, Account)> {
        let handles: Vec<(AccountId, Arc<Mutex<Account>>)> = {
            let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
            accounts.iter().map(|(id, h)| (*id, h.clone())).collect()
        };
        let mut out: Vec<(AccountId, Account)> = handles
            .into_iter()
            .map(|(id, h)| {
                let account = h.lock().unwrap_or_else(PoisonError::into_inner);
                (id, account.clone())
            })
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    pub fn statistics(&self) -> StatisticsSnapshot {
        self.stats.snapshot()
    }
}

/// Exclusive handle on one account, valid for the duration of a `with_account` call.
pub struct AccountEntry<'a> {
    id: AccountId,
    account: &'a mut Account,
    store: &'a AccountStore,
}

impl AccountEntry<'_> {
    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn balance(&self) -> Money {
        self.account.balance
    }

    pub fn add_balance(&mut self, amount: Money) -> Result<Money, Error> {
        if !amount.is_positive() {
            return Err(Error::InvalidAmount(amount));
        }
        let new_balance = self
            .account
            .balance
            .checked_add(amount)
            .ok_or(Error::InvalidAmount(amount))?;
        self.store.stats.try_credit(amount)?;
        self.account.balance = new_balance;
        Ok(new_balance)
    }

    pub fn subtract_balance(&mut self, amount: Money) -> Result<Money, Error> {
        if !amount.is_positive() {
            return Err(Error::InvalidAmount(amount));
        }
        if amount > self.account.balance {
            return Err(Error::InsufficientBalance {
                required: amount,
                available: self.account.balance,
            });
        }
        self.account.balance = Money(self.account.balance.as_minor() - amount.as_minor());
        self.store.stats.debit(amount);
        Ok(self.account.balance)
    }

    /// Records the first zero to nonzero transition. Returns `true` only the first time.
    pub fn mark_funded(&mut self) -> bool {
        if self.account.ever_funded || self.account.balance.is_zero() {
            return false;
        }
        self.account.ever_funded = true;
        self.store
            .funded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(self.id);
        self.store.stats.record_funded_account();
        true
    }

    pub fn goal(&self) -> Option<&SavingsGoal> {
        self.account.goal.as_ref()
    }

    pub fn goal_mut(&mut self) -> Option<&mut SavingsGoal> {
        self.account.goal.as_mut()
    }

    /// Replaces any existing goal.
    pub fn set_goal(&mut self, goal: SavingsGoal) {
        self.account.goal = Some(goal);
    }

    pub fn lock_goal(&mut self) -> Result<(), Error> {
        let id = self.id;
        let goal = self.account.goal.as_mut().ok_or(Error::NoGoalSet(id))?;
        if goal.locked {
            return Err(Error::AlreadyLocked(id));
        }
        goal.locked = true;
        Ok(())
    }

    pub fn unlock_goal(&mut self) -> Result<(), Error> {
        let goal = self
            .account
            .goal
            .as_mut()
            .ok_or(Error::NoGoalSet(self.id))?;
        goal.locked = false;
        Ok(())
    }

    pub fn pending_withdrawal(&self) -> Option<&WithdrawalRequest> {
        self.account.pending_withdrawal.as_ref()
    }

    pub fn withdrawal_state(&self) -> WithdrawalState {
        WithdrawalState::of(self.pending_withdrawal())
    }

    /// Stores a new request. Fails while an unexecuted request is outstanding.
    pub fn set_pending_withdrawal(&mut self, request: WithdrawalRequest) -> Result<(), Error> {
        if !self.withdrawal_state().accepts_request() {
            return Err(Error::RequestAlreadyExists(self.id));
        }
        self.account.pending_withdrawal = Some(request);
        Ok(())
    }

    pub(crate) fn mark_withdrawal_executed(&mut self) -> Result<(), Error> {
        let request = self
            .account
            .pending_withdrawal
            .as_mut()
            .ok_or(Error::NoRequest(self.id))?;
        request.executed = true;
        self.store.stats.record_withdrawal();
        Ok(())
    }

    pub fn clear_pending_withdrawal(&mut self) {
        self.account.pending_withdrawal = None;
    }

    pub fn add_partner(&mut self, partner: AccountId) -> Result<(), Error> {
        check_partner(self.id, partner)?;
        if !self.account.partners.insert(partner) {
            return Err(Error::DuplicatePartner(partner));
        }
        Ok(())
    }
}

/// Rejects partners that can never be valid, independent of existing state.
pub fn check_partner(owner: AccountId, partner: AccountId) -> Result<(), Error> {
    if partner == owner {
        return Err(Error::SelfPartner);
    }
    if partner.is_zero() {
        return Err(Error::ZeroAddress);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn units(n: i64) -> Money {
        Money(n * Money::SCALE)
    }

    #[test]
    fn balances_feed_the_total() {
        let store = AccountStore::new();
        store.add_balance(AccountId(1), units(3)).unwrap();
        store.add_balance(AccountId(2), units(5)).unwrap();
        store.subtract_balance(AccountId(1), units(1)).unwrap();

        assert_eq!(store.get_balance(AccountId(1)), units(2));
        assert_eq!(store.get_balance(AccountId(2)), units(5));
        assert_eq!(store.statistics().total_balance, units(7));
    }

    #[test]
    fn rejects_non_positive_and_overdraft() {
        let store = AccountStore::new();
        assert!(matches!(
            store.add_balance(AccountId(1), Money::zero()),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            store.add_balance(AccountId(1), Money(-5)),
            Err(Error::InvalidAmount(_))
        ));
        store.add_balance(AccountId(1), units(1)).unwrap();
        let err = store.subtract_balance(AccountId(1), units(2)).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientBalance { required, available }
                if required == units(2) && available == units(1)
        ));
        assert_eq!(store.get_balance(AccountId(1)), units(1));
        assert_eq!(store.statistics().total_balance, units(1));
    }

    #[test]
    fn rejected_credit_leaves_no_record() {
        let store = AccountStore::new();
        assert!(matches!(
            store.add_balance(AccountId(9), Money::zero()),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            store.add_balance(AccountId(9), Money(-1)),
            Err(Error::InvalidAmount(_))
        ));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn total_balance_never_wraps() {
        let store = AccountStore::new();
        store.add_balance(AccountId(1), Money(i64::MAX)).unwrap();

        let err = store.add_balance(AccountId(2), Money(1)).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(Money(1))));
        assert_eq!(store.statistics().total_balance, Money(i64::MAX));
        assert_eq!(store.get_balance(AccountId(2)), Money::zero());

        store.subtract_balance(AccountId(1), Money(1)).unwrap();
        store.add_balance(AccountId(2), Money(1)).unwrap();
        assert_eq!(store.statistics().total_balance, Money(i64::MAX));
    }

    #[test]
    fn unknown_account_reads_as_empty() {
        let store = AccountStore::new();
        assert_eq!(store.get_balance(AccountId(77)), Money::zero());
        assert!(store.get_goal(AccountId(77)).is_none());
        assert!(store.get_pending_withdrawal(AccountId(77)).is_none());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn funded_registry_records_each_account_once() {
        let store = AccountStore::new();
        for id in [3, 1, 3] {
            store
                .with_account(AccountId(id), |entry| {
                    entry.add_balance(units(1))?;
                    entry.mark_funded();
                    Ok(())
                })
                .unwrap();
        }
        store.subtract_balance(AccountId(1), units(1)).unwrap();
        store
            .with_account(AccountId(1), |entry| {
                entry.add_balance(units(1))?;
                assert!(!entry.mark_funded());
                Ok(())
            })
            .unwrap();

        assert_eq!(store.funded_accounts(), vec![AccountId(3), AccountId(1)]);
        assert_eq!(store.statistics().total_funded_accounts, 2);
    }

    #[test]
    fn goal_lock_transitions() {
        let store = AccountStore::new();
        let id = AccountId(4);
        assert!(matches!(store.lock_goal(id), Err(Error::NoGoalSet(_))));

        let deadline = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        store
            .set_goal(id, SavingsGoal::new(units(10), deadline, "car".into()))
            .unwrap();
        store.lock_goal(id).unwrap();
        assert!(matches!(store.lock_goal(id), Err(Error::AlreadyLocked(_))));
        assert!(store.get_goal(id).unwrap().locked);

        store.unlock_goal(id).unwrap();
        assert!(!store.get_goal(id).unwrap().locked);
    }

    #[test]
    fn only_one_outstanding_request() {
        let store = AccountStore::new();
        let id = AccountId(5);
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let request = WithdrawalRequest {
            amount: units(1),
            requested_at: now,
            unlock_time: now + Duration::days(7),
            executed: false,
        };

        store.set_pending_withdrawal(id, request.clone()).unwrap();
        assert!(matches!(
            store.set_pending_withdrawal(id, request.clone()),
            Err(Error::RequestAlreadyExists(_))
        ));

        store.clear_pending_withdrawal(id).unwrap();
        assert!(store.get_pending_withdrawal(id).is_none());
        store.set_pending_withdrawal(id, request).unwrap();
    }

    #[test]
    fn partner_rules() {
        let store = AccountStore::new();
        let id = AccountId(6);
        store
            .with_account(id, |entry| {
                assert!(matches!(entry.add_partner(id), Err(Error::SelfPartner)));
                assert!(matches!(
                    entry.add_partner(AccountId::ZERO),
                    Err(Error::ZeroAddress)
                ));
                entry.add_partner(AccountId(7))?;
                assert!(matches!(
                    entry.add_partner(AccountId(7)),
                    Err(Error::DuplicatePartner(AccountId(7)))
                ));
                Ok(())
            })
            .unwrap();
        assert_eq!(store.partners(id), vec![AccountId(7)]);
        assert!(store.partners(AccountId(7)).is_empty());
    }

    #[test]
    fn existing_account_access_does_not_create() {
        let store = AccountStore::new();
        let err = store
            .with_existing_account(AccountId(8), || Error::NoRequest(AccountId(8)), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, Error::NoRequest(AccountId(8))));
        assert!(store.snapshot().is_empty());

        store.add_balance(AccountId(8), units(1)).unwrap();
        let balance = store
            .with_existing_account(AccountId(8), || Error::NoRequest(AccountId(8)), |e| {
                Ok(e.balance())
            })
            .unwrap();
        assert_eq!(balance, units(1));
    }
}
