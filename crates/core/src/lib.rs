pub mod error;
pub mod ids;
pub mod models;
pub mod salary;
pub mod views;

pub use error::CoreError;
pub use ids::*;
pub use models::*;
pub use salary::Salary;
pub use views::*;

pub use rust_decimal::Decimal;
