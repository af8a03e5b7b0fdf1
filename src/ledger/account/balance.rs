use crate::ledger::{round_money, Amount, MONEY_PRECISION};
use crate::Error;

use serde::Serialize;

/// A balance is the amount of money held by an account, in cents.
///
/// It can never go below zero: constructing or updating a balance with a
/// negative amount fails, and the previous value is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Balance(Amount);

impl Balance {
    pub fn new(amount: Amount) -> Result<Self, Error> {
        let mut amount = round_money(amount);
        if amount.is_zero() {
            amount = Amount::ZERO;
        }
        if amount < Amount::ZERO {
            return Err(Error::InvalidInput(format!(
                "balance must not be negative, got {amount}"
            )));
        }
        amount.rescale(MONEY_PRECISION);

        Ok(Self(amount))
    }

    pub fn amount(&self) -> Amount {
        self.0
    }

    pub fn add(&mut self, amount: Amount) -> Result<(), Error> {
        let sum = self
            .0
            .checked_add(amount)
            .ok_or(Error::Overflow("new balance"))?;

        self.set(sum)
    }

    /// Store a freshly computed amount, rounded to cents.
    pub fn set(&mut self, amount: Amount) -> Result<(), Error> {
        *self = Self::new(amount)?;

        Ok(())
    }
}
