//! Greedy repayment allocation.
//!
//! Debts are ranked by how much of the overall monthly burden each one
//! carries relative to the total principal, and the budget is spent down that
//! ranking: whole debts first, then whatever is left on the next debt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::models::Debt;

pub const RATIONALE_FULL: &str = "Optimal monthly reduction achieved by paying in full.";
pub const RATIONALE_SINGLE_INSTALLMENT: &str =
    "Can't pay partially because the monthly amount is equal to the total amount.";
pub const RATIONALE_PARTIAL: &str = "Partial payment made due to budget constraints.";

/// What the allocator needs to know about a debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtSnapshot {
    pub id: String,
    pub total_amount: Decimal,
    pub monthly_amount: Decimal,
}

impl From<&Debt> for DebtSnapshot {
    fn from(debt: &Debt) -> Self {
        Self {
            id: debt.id.clone(),
            total_amount: debt.amount,
            monthly_amount: debt.installment_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Decision {
    PayInFull,
    PayPartial(Decimal),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub debt_id: String,
    pub decision: Decision,
    /// The efficiency score the debt was ranked by.
    pub monthly_reduction: Decimal,
    pub rationale: String,
}

impl Allocation {
    pub fn paid_amount(&self, total: Decimal) -> Decimal {
        match self.decision {
            Decision::PayInFull => total,
            Decision::PayPartial(amount) => amount,
        }
    }
}

/// Splits `budget` across `debts`.
///
/// Debts with no positive outstanding total are ignored. Ties in efficiency
/// keep their input order.
pub fn allocate(debts: &[DebtSnapshot], budget: Decimal) -> Vec<Allocation> {
    let open: Vec<&DebtSnapshot> = debts
        .iter()
        .filter(|d| d.total_amount > Decimal::ZERO)
        .collect();
    // saturates instead of overflowing; only the ranking depends on it
    let total = open
        .iter()
        .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d.total_amount));

    let mut ranked: Vec<(Decimal, &DebtSnapshot)> = open
        .into_iter()
        .map(|d| {
            let efficiency = d.monthly_amount.checked_div(total).unwrap_or(Decimal::ZERO);
            (efficiency, d)
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    let mut remaining = budget;
    let mut allocations = Vec::with_capacity(ranked.len());

    for (efficiency, debt) in ranked {
        let (decision, rationale) = if remaining >= debt.total_amount {
            remaining -= debt.total_amount;
            (Decision::PayInFull, RATIONALE_FULL)
        } else if debt.monthly_amount == debt.total_amount {
            (Decision::PayPartial(Decimal::ZERO), RATIONALE_SINGLE_INSTALLMENT)
        } else {
            let partial = remaining;
            remaining = Decimal::ZERO;
            (Decision::PayPartial(partial), RATIONALE_PARTIAL)
        };

        allocations.push(Allocation {
            debt_id: debt.id.clone(),
            decision,
            monthly_reduction: efficiency,
            rationale: rationale.to_string(),
        });
    }

    tracing::debug!(remaining = %remaining, "strategy allocated");

    allocations
        .into_iter()
        .filter(|a| match a.decision {
            Decision::PayPartial(amount) => amount > Decimal::ZERO,
            Decision::PayInFull => true,
        })
        .collect()
}
