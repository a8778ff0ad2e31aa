use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use crate::database::db::queries;
use crate::database::models::{Debt, DebtPatch, DebtQuery, DebtStatus, NewDebt};
use crate::debts::installments::installments_for_quota;
use crate::debts::strategy::{allocate, Allocation, DebtSnapshot};
use crate::debts::validation::{self, ValidationErrors};
use crate::debts::view::preview_rows;
use crate::error::DebtError;

/// Create request.
///
/// Either `installments` or a per-installment `installment_amount` must be
/// given; the quota form derives the installment count from the amount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateDebt {
    pub id: Option<String>,
    pub description: String,
    pub amount: Decimal,
    pub installments: Option<i64>,
    pub installment_amount: Option<Decimal>,
    pub status: Option<DebtStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPlan {
    pub budget: Decimal,
    pub allocations: Vec<Allocation>,
    /// Outstanding debts as they would look after the plan. Never persisted.
    pub preview: Vec<Debt>,
}

pub fn new_debt_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Clone)]
pub struct DebtService {
    pool: Pool<Sqlite>,
}

impl DebtService {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn create(&self, req: CreateDebt) -> Result<Debt, DebtError> {
        let installments = match (req.installments, req.installment_amount) {
            (Some(n), _) => n,
            (None, Some(quota)) => {
                validation::validate_quota(quota)?;
                installments_for_quota(req.amount, quota).ok_or_else(|| {
                    ValidationErrors::single("installment_amount", "Invalid installment amount")
                })?
            }
            (None, None) => {
                return Err(ValidationErrors::single(
                    "installments",
                    "Either installments or installment_amount is required",
                )
                .into())
            }
        };

        let description = req.description.trim().to_string();
        validation::validate_new_debt(&description, req.amount, installments)?;

        let new = NewDebt {
            id: req.id.filter(|id| !id.trim().is_empty()).unwrap_or_else(new_debt_id),
            description,
            amount: req.amount,
            installments,
            status: req.status.unwrap_or_default(),
        };
        let debt = queries::insert_debt(&self.pool, &new).await?;
        tracing::info!(debt_id = %debt.id, amount = %debt.amount, installments = debt.installments, "debt created");
        Ok(debt)
    }

    pub async fn list(&self, query: &DebtQuery) -> Result<Vec<Debt>, DebtError> {
        Ok(queries::list_debts(&self.pool, query).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Debt, DebtError> {
        queries::get_debt(&self.pool, id)
            .await?
            .ok_or_else(|| DebtError::NotFound(id.to_string()))
    }

    pub async fn update(&self, id: &str, mut patch: DebtPatch) -> Result<Debt, DebtError> {
        if let Some(description) = patch.description.as_mut() {
            *description = description.trim().to_string();
        }
        if patch.is_empty() {
            return self.get(id).await;
        }
        validation::validate_patch(&patch)?;
        let debt = self.write(id, &patch).await?;
        tracing::info!(debt_id = %id, "debt updated");
        Ok(debt)
    }

    pub async fn pay(&self, id: &str) -> Result<Debt, DebtError> {
        let patch = DebtPatch {
            status: Some(DebtStatus::Paid),
            ..Default::default()
        };
        let debt = self.write(id, &patch).await?;
        tracing::info!(debt_id = %id, "debt paid");
        Ok(debt)
    }

    /// Pays part of a debt. Paying exactly what is owed settles it.
    ///
    /// The outstanding amount is read and reduced inside one transaction.
    pub async fn partial_pay(&self, id: &str, payment: Decimal) -> Result<Debt, DebtError> {
        let mut tx = self.pool.begin().await?;
        let current = queries::fetch_debt(&mut *tx, id)
            .await?
            .ok_or_else(|| DebtError::NotFound(id.to_string()))?;
        if current.status == DebtStatus::Paid {
            return Err(ValidationErrors::single("amount", "The debt is already paid").into());
        }
        validation::validate_partial_payment(payment, current.amount)?;

        let remaining = current.amount - payment;
        let status = if remaining.is_zero() {
            DebtStatus::Paid
        } else {
            DebtStatus::Pending
        };
        let patch = DebtPatch {
            amount: Some(remaining),
            status: Some(status),
            ..Default::default()
        };
        let debt = queries::apply_patch(&mut *tx, id, &patch)
            .await?
            .ok_or_else(|| DebtError::NotFound(id.to_string()))?;
        tx.commit().await?;

        tracing::info!(debt_id = %id, payment = %payment, remaining = %remaining, "partial payment applied");
        Ok(debt)
    }

    pub async fn remove(&self, id: &str) -> Result<(), DebtError> {
        if !queries::delete_debt(&self.pool, id).await? {
            return Err(DebtError::NotFound(id.to_string()));
        }
        tracing::info!(debt_id = %id, "debt deleted");
        Ok(())
    }

    /// Runs the allocator over every debt not yet paid. Nothing is written.
    pub async fn plan_strategy(&self, budget: Decimal) -> Result<StrategyPlan, DebtError> {
        validation::validate_budget(budget)?;
        let outstanding = queries::list_debts(&self.pool, &DebtQuery::outstanding()).await?;
        let snapshots: Vec<DebtSnapshot> = outstanding.iter().map(DebtSnapshot::from).collect();
        let allocations = allocate(&snapshots, budget);
        let preview = preview_rows(&outstanding, &allocations);
        tracing::debug!(budget = %budget, allocations = allocations.len(), "strategy planned");

        Ok(StrategyPlan {
            budget,
            allocations,
            preview,
        })
    }

    async fn write(&self, id: &str, patch: &DebtPatch) -> Result<Debt, DebtError> {
        queries::update_debt(&self.pool, id, patch)
            .await?
            .ok_or_else(|| DebtError::NotFound(id.to_string()))
    }
}
