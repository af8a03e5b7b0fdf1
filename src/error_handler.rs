use crate::{input::Error, ledger::process::Rejected};

use std::sync::mpsc::Receiver;
use std::thread::JoinHandle;

// Bad rows and rejected commands don't stop the batch: they are logged, and
// the other commands keep being processed. Each handle returns how many
// errors it saw, so the caller can report them once the batch is done.
pub fn log(
    input_errors: Receiver<Error>,
    rejected_commands: Receiver<Rejected>,
) -> (JoinHandle<usize>, JoinHandle<usize>) {
    (
        std::thread::spawn(move || {
            let mut count = 0;
            for err in input_errors {
                tracing::warn!(%err, "skipped a transaction record");
                count += 1;
            }
            count
        }),
        std::thread::spawn(move || {
            let mut count = 0;
            for Rejected { command, error } in rejected_commands {
                tracing::warn!(
                    account_id = %command.account_id,
                    tx_type = ?command.tx_type,
                    amount = %command.amount,
                    date = %command.date,
                    %error,
                    "rejected a transaction"
                );
                count += 1;
            }
            count
        }),
    )
}
