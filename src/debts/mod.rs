//! Debt bookkeeping: installment math, input validation, the repayment
//! allocator, the in-memory table view and the service tying them to storage.

pub mod installments;
pub mod service;
pub mod strategy;
pub mod validation;
pub mod view;

pub use service::{CreateDebt, DebtService, StrategyPlan};
pub use strategy::{allocate, Allocation, DebtSnapshot, Decision};
