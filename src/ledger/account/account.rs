use crate::ledger::{AccountId, CustomerId, DepositoTypeId};

use super::balance::Balance;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Account is the stored state of a savings account.
///
/// The balance only ever changes through a deposit or a withdrawal applied to
/// the account. The deposito type is fixed once the account exists, and the
/// opening date is the anchor from which withdrawals count elapsed months.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,

    /// The product name the account was opened under.
    pub packet: String,

    pub balance: Balance,
    pub customer_id: CustomerId,
    pub deposito_type_id: DepositoTypeId,
    pub created_at: NaiveDateTime,
}
