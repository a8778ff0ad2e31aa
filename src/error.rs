use std::fmt;

use crate::debts::validation::ValidationErrors;

/// Failure of a debt operation.
///
/// Validation failures are reported back to the user; everything else is
/// treated as unhandled and only logged.
#[derive(Debug)]
pub enum DebtError {
    Validation(ValidationErrors),
    NotFound(String),
    Storage(sqlx::Error),
}

impl fmt::Display for DebtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtError::Validation(errors) => write!(f, "validation failed: {errors}"),
            DebtError::NotFound(id) => write!(f, "debt not found: {id}"),
            DebtError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for DebtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DebtError::Validation(errors) => Some(errors),
            DebtError::NotFound(_) => None,
            DebtError::Storage(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for DebtError {
    fn from(e: sqlx::Error) -> Self {
        DebtError::Storage(e)
    }
}

impl From<ValidationErrors> for DebtError {
    fn from(e: ValidationErrors) -> Self {
        DebtError::Validation(e)
    }
}

impl DebtError {
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            DebtError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
