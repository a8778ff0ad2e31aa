// src/backend/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backend::AppState;
use crate::database::models::{Debt, DebtPatch};
use crate::debts::validation;
use crate::debts::{CreateDebt, StrategyPlan};
use crate::error::DebtError;

/// Raw list filter, e.g. `?status=PENDING;OVERDUE&amount_min=10`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub amount_min: Option<String>,
    pub amount_max: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StrategyRequest {
    pub budget: Decimal,
}

pub async fn list_debts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Debt>>, DebtError> {
    let query = validation::parse_query(
        params.status.as_deref(),
        params.amount_min.as_deref(),
        params.amount_max.as_deref(),
    )?;
    let debts = state.debts.list(&query).await?;
    Ok(Json(debts))
}

pub async fn create_debt(
    State(state): State<AppState>,
    Json(payload): Json<CreateDebt>,
) -> Result<(StatusCode, Json<Debt>), DebtError> {
    let debt = state.debts.create(payload).await?;
    Ok((StatusCode::CREATED, Json(debt)))
}

pub async fn get_debt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Debt>, DebtError> {
    Ok(Json(state.debts.get(&id).await?))
}

pub async fn update_debt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<DebtPatch>,
) -> Result<Json<Debt>, DebtError> {
    Ok(Json(state.debts.update(&id, patch).await?))
}

pub async fn delete_debt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, DebtError> {
    state.debts.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn pay_debt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Debt>, DebtError> {
    Ok(Json(state.debts.pay(&id).await?))
}

pub async fn partial_pay_debt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<Debt>, DebtError> {
    Ok(Json(state.debts.partial_pay(&id, payload.amount).await?))
}

pub async fn plan_strategy(
    State(state): State<AppState>,
    Json(payload): Json<StrategyRequest>,
) -> Result<Json<StrategyPlan>, DebtError> {
    Ok(Json(state.debts.plan_strategy(payload.budget).await?))
}
