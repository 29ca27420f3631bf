use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of fractional digits a salary may carry.
pub const SALARY_SCALE: u32 = 2;

/// A non-negative money amount held as whole cents.
///
/// Cents are what the store persists, so sums computed by the store are
/// exact and convert back without rounding.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Salary(i64);

impl Salary {
    pub const ZERO: Salary = Salary(0);

    pub fn new(amount: Decimal) -> Result<Self, CoreError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CoreError::NegativeSalary(amount));
        }
        if amount.normalize().scale() > SALARY_SCALE {
            return Err(CoreError::SalaryPrecision(amount));
        }
        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|c| c.to_i64())
            .ok_or(CoreError::SalaryOutOfRange(amount))?;
        Ok(Self(cents))
    }

    pub fn from_cents(cents: i64) -> Result<Self, CoreError> {
        if cents < 0 {
            return Err(CoreError::NegativeSalary(Decimal::new(cents, SALARY_SCALE)));
        }
        Ok(Self(cents))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn amount(&self) -> Decimal {
        Decimal::new(self.0, SALARY_SCALE)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Render as US-style currency, e.g. `$85,000.00`.
    pub fn to_currency(&self) -> String {
        let whole = (self.0 / 100).to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("${grouped}.{:02}", self.0 % 100)
    }
}

impl TryFrom<Decimal> for Salary {
    type Error = CoreError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Salary> for Decimal {
    fn from(salary: Salary) -> Decimal {
        salary.amount()
    }
}

impl fmt::Debug for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salary({})", self.amount())
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount())
    }
}
