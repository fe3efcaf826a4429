use std::io::Read;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::domain::traits::CommandStream;
use crate::domain::{AccountId, Command, CommandKind, Error, Money};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Ok(Self { reader: Some(rdr) })
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    kind: String,
    at: DateTime<Utc>,
    account: u64,
    amount: Option<Money>,
    deadline: Option<DateTime<Utc>>,
    partner: Option<u64>,
    description: Option<String>,
}

fn required<T>(value: Option<T>, kind: &str, column: &str) -> Result<T, Error> {
    value.ok_or_else(|| Error::Ingestion(format!("{} requires a {} column", kind, column)))
}

impl TryFrom<CsvRow> for Command {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let kind_name = row.kind.trim().to_ascii_lowercase();
        let kind = match kind_name.as_str() {
            "deposit" => CommandKind::Deposit {
                amount: required(row.amount, &kind_name, "amount")?,
            },
            "request_withdrawal" => CommandKind::RequestWithdrawal {
                amount: required(row.amount, &kind_name, "amount")?,
            },
            "execute_withdrawal" => CommandKind::ExecuteWithdrawal,
            "set_goal" => CommandKind::SetGoal {
                target: required(row.amount, &kind_name, "amount")?,
                deadline: required(row.deadline, &kind_name, "deadline")?,
                description: row.description.unwrap_or_default(),
            },
            "lock_goal" => CommandKind::LockGoal,
            "add_partner" => CommandKind::AddPartner {
                partner: AccountId(required(row.partner, &kind_name, "partner")?),
            },
            "toggle_emergency_stop" => CommandKind::ToggleEmergencyStop,
            other => {
                return Err(Error::Ingestion(format!(
                    "Invalid command type: {}",
                    other
                )));
            }
        };

        Ok(Command {
            kind,
            account: AccountId(row.account),
            at: row.at,
        })
    }
}

impl<R: Read + Send + 'static> CommandStream for CsvReader<R> {
    type CmdStream = Pin<Box<dyn Stream<Item = Result<Command, Error>> + Send>>;

    fn stream(&mut self) -> Self::CmdStream {
        // Take ownership of the reader so the iterator we build owns all data and is 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<Command, Error>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => Command::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}
