use crate::ledger::{calendar::parse_timestamp, process::Command, transaction::Type, AccountId};

use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("malformed CSV: {0}")]
    Csv(String), // CSV is malformed

    #[error("malformed record: {0}")]
    Format(String), // Data format is incorrect
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<crate::Error> for Error {
    fn from(err: crate::Error) -> Self {
        Self::Format(err.to_string())
    }
}

// A bad row only skips that command: the rest of the batch is still applied,
// and the row is reported on the error channel.
pub fn parse(
    input_stream: (impl std::io::Read + Send + 'static),
) -> (Receiver<Command>, Receiver<Error>) {
    let (command_tx, command_rx): (Sender<Command>, Receiver<Command>) = mpsc::channel();
    let (error_tx, error_rx): (Sender<Error>, Receiver<Error>) = mpsc::channel();

    let buffered = std::io::BufReader::new(input_stream);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(buffered);

    // Moving to a new thread so we can start processing the commands immediately.
    std::thread::spawn(move || {
        for record in reader.deserialize::<CommandRecord>() {
            let sent = match convert(record) {
                Ok(command) => command_tx.send(command).is_ok(),
                Err(err) => error_tx.send(err).is_ok(),
            };
            if !sent {
                tracing::debug!("command receiver disconnected, stopping the reader");
                return;
            }
        }
    });

    (command_rx, error_rx)
}

// Convert from a csv deserialise result into a command result.
fn convert(record: Result<CommandRecord, csv::Error>) -> Result<Command, Error> {
    Ok(record?.try_into()?)
}

// The date is kept as a string here so it can accept several layouts, see
// `parse_timestamp`. Amounts are validated by the engine, which reports
// them as rejected commands.
#[derive(Debug, Deserialize)]
pub struct CommandRecord {
    #[serde(rename = "type")]
    tx_type: Type,

    #[serde(rename = "account")]
    account_id: AccountId,

    amount: Decimal,
    date: String,
}

impl TryFrom<CommandRecord> for Command {
    type Error = crate::Error;

    fn try_from(record: CommandRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            tx_type: record.tx_type,
            account_id: record.account_id,
            amount: record.amount,
            date: parse_timestamp(&record.date)?,
        })
    }
}
