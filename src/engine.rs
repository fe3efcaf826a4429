use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;

use crate::clock::ManualClock;
use crate::domain::{
    Clock, Command, CommandKind, Error, EventSink, ValueTransfer,
    traits::{CommandStream, DeadLetterQueue},
};
use crate::ledger::LedgerService;

/// Replays a stream of commands against a ledger, driving its clock from
/// each command's timestamp. Rejected commands go to the dead-letter queue.
#[derive(Debug)]
pub struct Engine<I, D, T, E>
where
    I: CommandStream,
    D: DeadLetterQueue,
    T: ValueTransfer,
    E: EventSink,
{
    ingestion: I,
    clock: Arc<ManualClock>,
    ledger: Arc<LedgerService<Arc<ManualClock>, T, E>>,
    dlq: D,
    started: bool,
}

impl<I, D, T, E> Engine<I, D, T, E>
where
    I: CommandStream,
    D: DeadLetterQueue,
    T: ValueTransfer,
    E: EventSink,
{
    pub fn new(
        ingestion: I,
        clock: Arc<ManualClock>,
        ledger: Arc<LedgerService<Arc<ManualClock>, T, E>>,
        dlq: D,
    ) -> Self {
        Self {
            ingestion,
            clock,
            ledger,
            dlq,
            started: false,
        }
    }

    pub fn ledger(&self) -> &Arc<LedgerService<Arc<ManualClock>, T, E>> {
        &self.ledger
    }

    pub async fn process(&mut self) -> Result<(), Error> {
        let mut res = self.ingestion.stream();

        while let Some(cmd) = res.next().await {
            match cmd {
                Ok(cmd) => match self.apply_command(cmd) {
                    Ok(()) => {}
                    Err(e) => self.dlq.report(&e),
                },
                Err(e) => self.dlq.report(&e),
            }
        }

        let stats = self.ledger.statistics();
        tracing::info!(
            total_balance = %stats.total_balance,
            funded_accounts = stats.total_funded_accounts,
            executed_withdrawals = stats.total_executed_withdrawals,
            "replay finished"
        );
        Ok(())
    }

    fn advance_clock(&mut self, at: DateTime<Utc>) -> Result<(), Error> {
        if self.started && at < self.clock.now() {
            return Err(Error::Ingestion(format!(
                "Command timestamp {} is earlier than {}",
                at,
                self.clock.now()
            )));
        }
        self.started = true;
        self.clock.set(at);
        Ok(())
    }

    fn apply_command(&mut self, cmd: Command) -> Result<(), Error> {
        tracing::debug!(command = %cmd, "applying");
        self.advance_clock(cmd.at)?;

        let account = cmd.account;
        match cmd.kind {
            CommandKind::Deposit { amount } => self.ledger.deposit(account, amount).map(|_| ()),
            CommandKind::RequestWithdrawal { amount } => self
                .ledger
                .request_withdrawal(account, amount)
                .map(|_| ()),
            CommandKind::ExecuteWithdrawal => {
                self.ledger.execute_withdrawal(account).map(|_| ())
            }
            CommandKind::SetGoal {
                target,
                deadline,
                description,
            } => self
                .ledger
                .set_goal(account, target, deadline, description)
                .map(|_| ()),
            CommandKind::LockGoal => self.ledger.lock_goal(account),
            CommandKind::AddPartner { partner } => self.ledger.add_partner(account, partner),
            CommandKind::ToggleEmergencyStop => {
                self.ledger.toggle_emergency_stop(account).map(|_| ())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::stream;

    use super::*;
    use crate::config::Config;
    use crate::domain::{AccountId, Money};
    use crate::events::MemoryEventSink;
    use crate::transfer::PayoutLog;

    struct VecStream(Option<Vec<Result<Command, Error>>>);

    impl CommandStream for VecStream {
        type CmdStream = stream::Iter<std::vec::IntoIter<Result<Command, Error>>>;

        fn stream(&mut self) -> Self::CmdStream {
            stream::iter(self.0.take().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct CollectingDLQ(Mutex<Vec<String>>);

    impl DeadLetterQueue for &CollectingDLQ {
        fn report(&self, error: &Error) {
            self.0.lock().unwrap().push(error.to_string());
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        format!("2026-01-{:02}T00:00:00Z", day).parse().unwrap()
    }

    fn cmd(day: u32, account: u64, kind: CommandKind) -> Result<Command, Error> {
        Ok(Command {
            kind,
            account: AccountId(account),
            at: at(day),
        })
    }

    #[tokio::test]
    async fn replays_time_locked_withdrawal() {
        let clock = Arc::new(ManualClock::default());
        let ledger = Arc::new(LedgerService::new(
            Config::default(),
            clock.clone(),
            PayoutLog::new(),
            Arc::new(MemoryEventSink::new()),
        ));
        let dlq = CollectingDLQ::default();
        let amount = Money(10_000);
        let commands = vec![
            cmd(1, 7, CommandKind::Deposit { amount }),
            cmd(1, 7, CommandKind::RequestWithdrawal { amount }),
            cmd(3, 7, CommandKind::ExecuteWithdrawal),
            cmd(8, 7, CommandKind::ExecuteWithdrawal),
            cmd(2, 7, CommandKind::Deposit { amount }),
            Err(Error::Ingestion("broken row".into())),
        ];

        let mut engine = Engine::new(VecStream(Some(commands)), clock, ledger, &dlq);
        engine.process().await.unwrap();

        let reported = dlq.0.lock().unwrap().clone();
        assert_eq!(reported.len(), 3);
        assert!(reported[0].contains("time-locked"));
        assert!(reported[1].contains("earlier than"));
        assert_eq!(reported[2], "Ingestion failed with: broken row");

        let ledger = engine.ledger();
        assert_eq!(ledger.get_balance(AccountId(7)), Money::zero());
        assert_eq!(ledger.statistics().total_executed_withdrawals, 1);
        assert_eq!(ledger.transfer().payouts(), vec![(AccountId(7), amount)]);
    }
}
