use crate::ledger::Amount;
use crate::Error;

use super::account::Account;

impl Account {
    /// Add a deposited amount to the balance.
    ///
    /// There is no upper bound on deposits, only decimal overflow stops one.
    pub(crate) fn apply_deposit(&mut self, amount: Amount) -> Result<(), Error> {
        self.balance.add(amount)
    }
}
