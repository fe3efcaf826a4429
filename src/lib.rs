pub mod clock;
pub mod config;
pub mod dlq;
pub mod domain;
pub mod engine;
pub mod events;
pub mod goals;
pub mod ingestion;
pub mod ledger;
pub mod report;
pub mod scheduler;
pub mod statistics;
pub mod store;
pub mod transfer;

pub use config::Config;
pub use domain::*;
pub use ledger::LedgerService;
pub use statistics::StatisticsSnapshot;
pub use store::AccountStore;
