pub mod account;
pub mod calendar;
pub mod engine;
pub mod interest;
pub mod process;
pub mod transaction;

use rust_decimal::{Decimal, RoundingStrategy};

// Named ids don't provide any compiler help, but they make signatures such as
// `fn commit(&self, account_id: AccountId, ..)` self-explanatory, and switching
// the id representation later only touches this file.
pub type AccountId = uuid::Uuid;
pub type CustomerId = uuid::Uuid;
pub type DepositoTypeId = uuid::Uuid;
pub type TransactionId = uuid::Uuid;

// Money is never a float: balances and amounts are exact decimals with cent
// precision, rates are fractions with six decimal places.
pub type Amount = Decimal;
pub type Rate = Decimal;
pub(crate) const MONEY_PRECISION: u32 = 2;
pub(crate) const RATE_PRECISION: u32 = 6;

/// Round an amount to cents, half away from zero.
pub fn round_money(amount: Amount) -> Amount {
    amount.round_dp_with_strategy(MONEY_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a rate to its stored precision, half away from zero.
pub fn round_rate(rate: Rate) -> Rate {
    rate.round_dp_with_strategy(RATE_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}

/// What to do with a withdrawal dated before the account was opened.
///
/// The elapsed month count is negative in that case, so accruing means the
/// interest term shrinks the balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BackdatePolicy {
    /// Apply the formula as is, with negative interest.
    #[default]
    Accrue,

    /// Refuse the withdrawal with an invalid input error.
    Reject,
}
