use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Money, SavingsGoal, WithdrawalRequest};

/// Identity of a ledger account. The zero id is reserved and never a valid partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl AccountId {
    pub const ZERO: AccountId = AccountId(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AccountId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Per-account record. Mutation goes through `store::AccountEntry` so the
/// aggregate statistics stay in step with the balance.
#[derive(Debug, Clone, Default)]
pub struct Account {
    pub(crate) balance: Money,
    pub(crate) goal: Option<SavingsGoal>,
    pub(crate) pending_withdrawal: Option<WithdrawalRequest>,
    pub(crate) partners: BTreeSet<AccountId>,
    pub(crate) ever_funded: bool,
}

impl Account {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn goal(&self) -> Option<&SavingsGoal> {
        self.goal.as_ref()
    }

    pub fn pending_withdrawal(&self) -> Option<&WithdrawalRequest> {
        self.pending_withdrawal.as_ref()
    }

    pub fn partners(&self) -> &BTreeSet<AccountId> {
        &self.partners
    }

    pub fn is_partner(&self, id: &AccountId) -> bool {
        self.partners.contains(id)
    }
}
