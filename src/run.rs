use crate::ledger::{engine::Engine, process::process, BackdatePolicy};
use crate::store::{AccountDetails, MemoryStore};
use crate::{error_handler, input, output, snapshot};

use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub workers: usize,
    pub backdate_policy: BackdatePolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            workers: 4,
            backdate_policy: BackdatePolicy::default(),
        }
    }
}

/// What a batch did, once every command has been applied.
#[derive(Debug)]
pub struct Summary {
    pub committed: usize,
    pub rejected: usize,
    pub malformed: usize,
    pub accounts: Vec<AccountDetails>,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to load the snapshot: {0}")]
    Snapshot(#[from] snapshot::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] crate::Error),

    #[error("the {0} thread panicked")]
    Panicked(&'static str),
}

/// Load the accounts from `snapshot`, apply the commands read from
/// `transactions`, and write every committed transaction to `output`.
pub fn run(
    snapshot: impl std::io::Read,
    transactions: impl std::io::Read + Send + 'static,
    output: impl std::io::Write,
    options: &Options,
) -> Result<Summary, RunError> {
    let store = MemoryStore::new();
    snapshot::load(snapshot, &store)?;
    let engine = Engine::new(Arc::new(store), options.backdate_policy);

    let (commands, input_errors) = input::parse(transactions);
    let (outcomes, rejected_commands) = process(engine.clone(), commands, options.workers);
    let (malformed, rejected) = error_handler::log(input_errors, rejected_commands);

    let committed = output::write_transactions(output, outcomes)?;
    let malformed = malformed
        .join()
        .map_err(|_| RunError::Panicked("input error log"))?;
    let rejected = rejected
        .join()
        .map_err(|_| RunError::Panicked("rejected command log"))?;

    let accounts = engine.store().list_accounts()?;
    tracing::info!(committed, rejected, malformed, "batch done");

    Ok(Summary {
        committed,
        rejected,
        malformed,
        accounts,
    })
}
