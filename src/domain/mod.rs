pub mod account;
pub mod command;
pub mod error;
pub mod event;
pub mod goal;
pub mod money;
pub mod traits;
pub mod withdrawal;

pub use account::{Account, AccountId};
pub use command::{Command, CommandKind};
pub use error::{Error, ErrorKind};
pub use event::LedgerEvent;
pub use goal::SavingsGoal;
pub use money::Money;
pub use traits::{Clock, CommandStream, DeadLetterQueue, EventSink, ValueTransfer};
pub use withdrawal::{WithdrawalRequest, WithdrawalState};
