pub mod backend;
pub mod cli;
pub mod config;
pub mod database;
pub mod debts;
pub mod error;
pub mod logging;
