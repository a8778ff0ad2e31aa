use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};

use crate::database::db::connection;
use crate::database::models::{Debt, DebtPatch, DebtQuery};
use crate::debts::service::new_debt_id;
use crate::debts::{CreateDebt, DebtService};
use crate::error::DebtError;

/// The TUI's handle on storage. New debts get their id here, before they
/// reach the database.
#[derive(Clone)]
pub struct Client {
    debts: DebtService,
}

impl Client {
    pub async fn sqlite(db_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = connection::connect(db_url, max_connections).await?;
        Ok(Self::new(pool))
    }

    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            debts: DebtService::new(pool),
        }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        self.debts.pool()
    }

    pub async fn list_debts(&self) -> Result<Vec<Debt>, DebtError> {
        self.debts.list(&DebtQuery::default()).await
    }

    pub async fn create_debt(&self, mut req: CreateDebt) -> Result<Debt, DebtError> {
        req.id = Some(new_debt_id());
        self.debts.create(req).await
    }

    pub async fn update_debt(&self, id: &str, patch: DebtPatch) -> Result<Debt, DebtError> {
        self.debts.update(id, patch).await
    }

    pub async fn pay_debt(&self, id: &str) -> Result<Debt, DebtError> {
        self.debts.pay(id).await
    }

    pub async fn partial_pay(&self, id: &str, amount: Decimal) -> Result<Debt, DebtError> {
        self.debts.partial_pay(id, amount).await
    }

    pub async fn delete_debt(&self, id: &str) -> Result<(), DebtError> {
        self.debts.remove(id).await
    }
}
