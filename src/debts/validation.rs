//! Input checks for every write path.
//!
//! Each check records an [`Issue`] against the offending field instead of
//! stopping at the first failure, so a form can flag all of its fields at once.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{DebtPatch, DebtQuery, DebtStatus};

pub const MIN_DESCRIPTION_CHARS: usize = 5;
pub const MAX_FRACTION_DIGITS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub issues: Vec<Issue>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(Issue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// First message recorded for `field`, used to annotate form inputs.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.issues
            .iter()
            .find(|i| i.field == field)
            .map(|i| i.message.as_str())
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.field, i.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Parses user-typed money, e.g. `"1200.50"`.
pub fn parse_decimal(field: &str, input: &str) -> Result<Decimal, ValidationErrors> {
    Decimal::from_str_exact(input.trim())
        .map_err(|_| ValidationErrors::single(field, "Invalid number"))
}

pub fn parse_installments(field: &str, input: &str) -> Result<i64, ValidationErrors> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationErrors::single(field, "Invalid number"))
}

// "12.500" counts as two digits; trailing zeros are not significant.
fn fraction_digits(value: Decimal) -> u32 {
    value.normalize().scale()
}

pub fn check_description(errors: &mut ValidationErrors, description: &str) {
    if description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        errors.add(
            "description",
            format!("Description should have at least {MIN_DESCRIPTION_CHARS} characters"),
        );
    }
}

pub fn check_amount(errors: &mut ValidationErrors, field: &str, amount: Decimal) {
    if amount <= Decimal::ZERO {
        errors.add(field, "Amount should be positive");
    }
    if fraction_digits(amount) > MAX_FRACTION_DIGITS {
        errors.add(field, "Amount should have a maximum of 2 decimal places");
    }
}

pub fn check_installments(errors: &mut ValidationErrors, installments: i64) {
    if installments < 0 {
        errors.add("installments", "Installments should not be negative");
    }
}

pub fn validate_new_debt(
    description: &str,
    amount: Decimal,
    installments: i64,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_description(&mut errors, description);
    check_amount(&mut errors, "amount", amount);
    check_installments(&mut errors, installments);
    errors.into_result()
}

pub fn validate_patch(patch: &DebtPatch) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(description) = &patch.description {
        check_description(&mut errors, description);
    }
    if let Some(amount) = patch.amount {
        check_amount(&mut errors, "amount", amount);
    }
    if let Some(installments) = patch.installments {
        check_installments(&mut errors, installments);
    }
    errors.into_result()
}

pub fn validate_quota(quota: Decimal) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_amount(&mut errors, "installment_amount", quota);
    errors.into_result()
}

/// A partial payment must be positive and no larger than what is still owed.
pub fn validate_partial_payment(payment: Decimal, outstanding: Decimal) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_amount(&mut errors, "amount", payment);
    if payment > outstanding {
        errors.add("amount", "The amount should be less than the total");
    }
    errors.into_result()
}

pub fn validate_budget(budget: Decimal) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if budget < Decimal::ZERO {
        errors.add("budget", "Budget should not be negative");
    }
    if fraction_digits(budget) > MAX_FRACTION_DIGITS {
        errors.add("budget", "Budget should have a maximum of 2 decimal places");
    }
    errors.into_result()
}

/// Builds a list filter from raw query values.
///
/// `status` is a `;`-separated list such as `PENDING;OVERDUE`.
pub fn parse_query(
    status: Option<&str>,
    amount_min: Option<&str>,
    amount_max: Option<&str>,
) -> Result<DebtQuery, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut query = DebtQuery::default();

    if let Some(raw) = status.filter(|s| !s.trim().is_empty()) {
        let mut statuses = Vec::new();
        for token in raw.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            match token.parse::<DebtStatus>() {
                Ok(s) => statuses.push(s),
                Err(e) => errors.add("status", e.to_string()),
            }
        }
        query.statuses = Some(statuses);
    }

    let mut bound = |field: &str, raw: Option<&str>| match raw.filter(|s| !s.trim().is_empty()) {
        Some(raw) => match Decimal::from_str_exact(raw.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                errors.add(field, "Invalid number");
                None
            }
        },
        None => None,
    };
    query.amount_min = bound("amount_min", amount_min);
    query.amount_max = bound("amount_max", amount_max);

    if let (Some(min), Some(max)) = (query.amount_min, query.amount_max) {
        if min >= max {
            errors.add("amount_min", "amount_min should be lower than amount_max");
        }
    }

    errors.into_result().map(|_| query)
}
