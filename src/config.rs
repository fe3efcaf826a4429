//! Ledger configuration, loaded from environment variables with defaults.

use std::env;

use chrono::Duration;

use crate::domain::{AccountId, Money};

const WITHDRAWAL_DELAY_VAR: &str = "LEDGER_WITHDRAWAL_DELAY_SECS";
const MIN_GOAL_TARGET_VAR: &str = "LEDGER_MIN_GOAL_TARGET";
const ADMIN_VAR: &str = "LEDGER_ADMIN";

const DEFAULT_WITHDRAWAL_DELAY_SECS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_MIN_GOAL_TARGET: Money = Money(100); // 0.01
const DEFAULT_ADMIN: AccountId = AccountId(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Time between a withdrawal request and the earliest execution.
    pub withdrawal_delay: Duration,

    /// Smallest accepted savings goal target.
    pub min_goal_target: Money,

    /// Account allowed to toggle the emergency stop.
    pub administrator: AccountId,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            withdrawal_delay: Duration::seconds(DEFAULT_WITHDRAWAL_DELAY_SECS),
            min_goal_target: DEFAULT_MIN_GOAL_TARGET,
            administrator: DEFAULT_ADMIN,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let withdrawal_delay = match lookup(WITHDRAWAL_DELAY_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(Duration::try_seconds)
                .ok_or(ConfigError::InvalidValue(WITHDRAWAL_DELAY_VAR))?,
            None => defaults.withdrawal_delay,
        };

        let min_goal_target = match lookup(MIN_GOAL_TARGET_VAR) {
            Some(raw) => Money::from_decimal_str(&raw)
                .ok_or(ConfigError::InvalidValue(MIN_GOAL_TARGET_VAR))?,
            None => defaults.min_goal_target,
        };

        let administrator = match lookup(ADMIN_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(AccountId)
                .map_err(|_| ConfigError::InvalidValue(ADMIN_VAR))?,
            None => defaults.administrator,
        };

        let config = Self {
            withdrawal_delay,
            min_goal_target,
            administrator,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.withdrawal_delay <= Duration::zero() {
            return Err(ConfigError::InvalidValue(WITHDRAWAL_DELAY_VAR));
        }
        if !self.min_goal_target.is_positive() {
            return Err(ConfigError::InvalidValue(MIN_GOAL_TARGET_VAR));
        }
        if self.administrator.is_zero() {
            return Err(ConfigError::InvalidValue(ADMIN_VAR));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
