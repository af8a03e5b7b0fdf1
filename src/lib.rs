//! Savings accounts ("depositos") that accrue simple interest, with an
//! append-only ledger of deposits and withdrawals.
//!
//! [Engine] applies deposits and withdrawals atomically against a store;
//! [store::MemoryStore] keeps the accounts, their owners and deposito types.
//! The remaining modules make up the CSV batch pipeline run by the binary.

pub mod config;
pub mod error;
pub mod error_handler;
pub mod input;
pub mod ledger;
pub mod output;
pub mod run;
pub mod snapshot;
pub mod store;

pub use error::{Error, Resource};
pub use ledger::engine::{Engine, Withdrawal};
