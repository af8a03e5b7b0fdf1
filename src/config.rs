use crate::ledger::BackdatePolicy;
use crate::run::Options;

use clap::Parser;
use std::path::PathBuf;

/// Apply a batch of deposits and withdrawals to savings accounts.
///
/// Committed transactions are written as CSV as they happen; rejected ones
/// are logged and skipped.
#[derive(Parser, Debug)]
#[command(name = "deposito_engine", version, about, long_about = None)]
pub struct Config {
    /// Accounts to start from, in the layout written by `--balances`.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Commands to apply, with the columns `type,account,amount,date`.
    #[arg(long)]
    pub transactions: PathBuf,

    /// Where to write committed transactions. Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Where to write the account balances once every command is applied.
    #[arg(long)]
    pub balances: Option<PathBuf>,

    /// How many threads apply commands. Each account is handled by one of them.
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// What to do with withdrawals dated before the account was opened.
    #[arg(long, value_enum, default_value_t = BackdatePolicy::Accrue)]
    pub backdated_withdrawals: BackdatePolicy,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn options(&self) -> Options {
        Options {
            workers: self.workers,
            backdate_policy: self.backdated_withdrawals,
        }
    }
}
