use super::{Amount, Rate};
use crate::Error;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// How a withdrawal grew the balance before deducting the withdrawn amount.
///
/// Interest is simple and linear: every whole month since the account was
/// opened adds a twelfth of the yearly return, computed on the balance as it
/// stands at withdrawal time. Nothing here is rounded; only the balance that
/// gets stored is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestCalculation {
    pub starting_balance: Amount,
    pub months: i32,
    pub yearly_return: Rate,
    pub monthly_return: Rate,
    pub ending_balance: Amount,
}

impl InterestCalculation {
    pub fn new(starting_balance: Amount, yearly_return: Rate, months: i32) -> Result<Self, Error> {
        let monthly_return = yearly_return
            .checked_div(dec!(12))
            .ok_or(Error::Overflow("monthly return"))?;

        let growth = monthly_return
            .checked_mul(Decimal::from(months))
            .and_then(|accrued| accrued.checked_add(Decimal::ONE))
            .ok_or(Error::Overflow("interest factor"))?;

        let ending_balance = starting_balance
            .checked_mul(growth)
            .ok_or(Error::Overflow("ending balance"))?;

        Ok(Self {
            starting_balance,
            months,
            yearly_return,
            monthly_return,
            ending_balance,
        })
    }

    /// The interest absorbed into the balance. Negative for backdated
    /// withdrawals.
    pub fn interest(&self) -> Amount {
        self.ending_balance - self.starting_balance
    }
}

#[cfg(test)]
mod tests {
    use super::InterestCalculation;

    use rust_decimal_macros::dec;

    #[test]
    fn test_half_year_at_twelve_percent() {
        let got = InterestCalculation::new(dec!(1000000), dec!(0.12), 6).unwrap();

        assert_eq!(dec!(0.01), got.monthly_return);
        assert_eq!(dec!(1060000), got.ending_balance);
        assert_eq!(dec!(60000), got.interest());
    }

    #[test]
    fn test_zero_months_keeps_balance() {
        for yearly_return in vec![dec!(0), dec!(0.03), dec!(0.05), dec!(1)] {
            let got = InterestCalculation::new(dec!(1234.56), yearly_return, 0).unwrap();
            assert_eq!(dec!(1234.56), got.ending_balance);
            assert_eq!(dec!(0), got.interest());
        }
    }

    #[test]
    fn test_one_month_is_not_rounded() {
        let got = InterestCalculation::new(dec!(100), dec!(0.05), 1).unwrap();

        assert!(got.ending_balance > dec!(100.4166));
        assert!(got.ending_balance < dec!(100.4167));
    }

    #[test]
    fn test_negative_months_shrink_balance() {
        let got = InterestCalculation::new(dec!(100), dec!(0.12), -12).unwrap();

        assert_eq!(-12, got.months);
        assert_eq!(dec!(88), got.ending_balance);
        assert_eq!(dec!(-12), got.interest());
    }

    #[test]
    fn test_overflow() {
        let very_big_number = rust_decimal::Decimal::MAX;

        let got = InterestCalculation::new(very_big_number, dec!(1), 12);
        assert_eq!(Err(crate::Error::Overflow("ending balance")), got);
    }
}
