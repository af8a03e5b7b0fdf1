//! Savings accounts and the balance mutations a transaction applies to them.
//!
//! Account: the stored state of a savings account, anchored at its opening date.
//! Balance: a non-negative amount in cents.
//! Each operation lives in its own file as an `impl Account` block.

#[allow(clippy::module_inception)]
pub mod account;
pub mod balance;
mod deposit;
mod withdrawal;

pub use account::Account;
pub use balance::Balance;
