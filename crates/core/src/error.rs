use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("salary must not be negative: {0}")]
    NegativeSalary(Decimal),

    #[error("salary has more than two decimal places: {0}")]
    SalaryPrecision(Decimal),

    #[error("salary out of range: {0}")]
    SalaryOutOfRange(Decimal),
}
