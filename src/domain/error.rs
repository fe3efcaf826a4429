use chrono::{DateTime, Utc};

use crate::config::ConfigError;
use crate::domain::{AccountId, Money};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Money),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Money, available: Money },

    #[error("Account {0} already has a pending withdrawal request")]
    RequestAlreadyExists(AccountId),

    #[error("Account {0} has no withdrawal request")]
    NoRequest(AccountId),

    #[error("Withdrawal is time-locked until {unlock_time}")]
    TimeLockNotExpired { unlock_time: DateTime<Utc> },

    #[error("Withdrawal request for account {0} was already executed")]
    AlreadyExecuted(AccountId),

    #[error("Savings goal is locked until {deadline}")]
    GoalLocked { deadline: DateTime<Utc> },

    #[error("Goal target {target} is below the minimum {minimum}")]
    TargetTooLow { target: Money, minimum: Money },

    #[error("Goal deadline {deadline} is not in the future")]
    DeadlineInPast { deadline: DateTime<Utc> },

    #[error("Account {0} has no savings goal")]
    NoGoalSet(AccountId),

    #[error("Savings goal of account {0} is already locked")]
    AlreadyLocked(AccountId),

    #[error("An account cannot be its own partner")]
    SelfPartner,

    #[error("The zero account cannot be used here")]
    ZeroAddress,

    #[error("Account {0} is already a partner")]
    DuplicatePartner(AccountId),

    #[error("Account {caller} is not authorized for this operation")]
    Unauthorized { caller: AccountId },

    #[error("Emergency stop is active")]
    EmergencyStopActive,

    #[error("Value transfer failed with: {0}")]
    TransferFailed(String),
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; retry with corrected values.
    Validation,
    /// Not valid in the current state; wait or perform a prerequisite first.
    State,
    /// Caller lacks the privilege.
    Authorization,
    /// I/O, ingestion, configuration or collaborator failures.
    Infrastructure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::TargetTooLow { .. }
            | Self::DeadlineInPast { .. }
            | Self::SelfPartner
            | Self::ZeroAddress
            | Self::DuplicatePartner(_) => ErrorKind::Validation,
            Self::InsufficientBalance { .. }
            | Self::RequestAlreadyExists(_)
            | Self::NoRequest(_)
            | Self::TimeLockNotExpired { .. }
            | Self::AlreadyExecuted(_)
            | Self::GoalLocked { .. }
            | Self::NoGoalSet(_)
            | Self::AlreadyLocked(_)
            | Self::EmergencyStopActive => ErrorKind::State,
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::IO(_) | Self::Ingestion(_) | Self::Config(_) | Self::TransferFailed(_) => {
                ErrorKind::Infrastructure
            }
        }
    }
}
