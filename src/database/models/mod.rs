pub mod debt;

pub use debt::{Debt, DebtPatch, DebtQuery, DebtStatus, NewDebt, UnknownStatus};
