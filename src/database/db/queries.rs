use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::database::models::{Debt, DebtPatch, DebtQuery, DebtStatus, NewDebt};
use crate::debts::installments::installment_amount;

/*
SQL for the `debts` table.
Money columns are TEXT so the exact decimal survives the round trip.
 */

const DEBT_COLUMNS: &str =
    "id, description, amount, installments, installment_amount, status, created_at";

fn decode_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(column)?;
    Decimal::from_str_exact(text.trim())
        .map_err(|e| sqlx::Error::Decode(format!("Invalid Decimal format for {}: {}", column, e).into()))
}

fn decode_timestamp(text: &str) -> Result<NaiveDateTime, sqlx::Error> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| sqlx::Error::Decode(format!("Invalid timestamp {:?}: {}", text, e).into()))
}

fn debt_from_row(row: &SqliteRow) -> Result<Debt, sqlx::Error> {
    let status_text: String = row.try_get("status")?;
    let status = status_text
        .parse::<DebtStatus>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Debt {
        id: row.try_get("id")?,
        description: row.try_get("description")?,
        amount: decode_decimal(row, "amount")?,
        installments: row.try_get("installments")?,
        installment_amount: decode_decimal(row, "installment_amount")?,
        status,
        created_at: decode_timestamp(&created_at)?,
    })
}

/*========== Create ========== */

// The installment amount is derived here, never taken from the caller.
pub async fn insert_debt(pool: &Pool<Sqlite>, debt: &NewDebt) -> Result<Debt, sqlx::Error> {
    let quota = installment_amount(debt.amount, debt.installments);

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO debts (id, description, amount, installments, installment_amount, status)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {DEBT_COLUMNS}
        "#
    ))
    .bind(&debt.id)
    .bind(&debt.description)
    .bind(debt.amount.to_string())
    .bind(debt.installments)
    .bind(quota.to_string())
    .bind(debt.status.as_str())
    .fetch_one(pool)
    .await?;

    debt_from_row(&row)
}

/*========== Read ========== */

pub async fn get_debt(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Debt>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {DEBT_COLUMNS} FROM debts WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(debt_from_row).transpose()
}

pub async fn list_debts(pool: &Pool<Sqlite>, query: &DebtQuery) -> Result<Vec<Debt>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {DEBT_COLUMNS} FROM debts WHERE 1 = 1"));

    if let Some(statuses) = &query.statuses {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        qb.push(" AND status IN (");
        let mut list = qb.separated(", ");
        for status in statuses {
            list.push_bind(status.as_str());
        }
        list.push_unseparated(")");
    }
    if let Some(min) = query.amount_min {
        qb.push(" AND CAST(amount AS REAL) >= ")
            .push_bind(min.to_f64().unwrap_or(f64::MIN));
    }
    if let Some(max) = query.amount_max {
        qb.push(" AND CAST(amount AS REAL) <= ")
            .push_bind(max.to_f64().unwrap_or(f64::MAX));
    }
    qb.push(" ORDER BY created_at ASC, rowid ASC");

    qb.build()
        .fetch_all(pool)
        .await?
        .iter()
        .map(debt_from_row)
        .collect::<Result<Vec<Debt>, sqlx::Error>>()
}

/*========== Update ========== */

/// Applies the patch and recomputes the installment amount in one transaction.
/// Returns `None` when no debt has this id.
pub async fn update_debt(
    pool: &Pool<Sqlite>,
    id: &str,
    patch: &DebtPatch,
) -> Result<Option<Debt>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let debt = apply_patch(&mut *tx, id, patch).await?;
    if debt.is_some() {
        tx.commit().await?;
    } else {
        tx.rollback().await?;
    }

    Ok(debt)
}

/// Same as [`get_debt`], on a connection the caller controls (usually a transaction).
pub async fn fetch_debt(conn: &mut SqliteConnection, id: &str) -> Result<Option<Debt>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {DEBT_COLUMNS} FROM debts WHERE id = ? LIMIT 1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(debt_from_row).transpose()
}

/// Patch step of [`update_debt`] without the transaction handling.
pub async fn apply_patch(
    conn: &mut SqliteConnection,
    id: &str,
    patch: &DebtPatch,
) -> Result<Option<Debt>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE debts
        SET description = COALESCE(?, description),
            amount      = COALESCE(?, amount),
            installments = COALESCE(?, installments),
            status      = COALESCE(?, status)
        WHERE id = ?
        "#,
    )
    .bind(patch.description.as_deref())
    .bind(patch.amount.map(|a| a.to_string()))
    .bind(patch.installments)
    .bind(patch.status.map(|s| s.as_str()))
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    recalculate_installments(conn, id).await
}

/// Re-derives `installment_amount` from the stored amount and installment count.
pub async fn recalculate_installments(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Debt>, sqlx::Error> {
    let Some(mut debt) = fetch_debt(&mut *conn, id).await? else {
        return Ok(None);
    };

    debt.installment_amount = installment_amount(debt.amount, debt.installments);
    sqlx::query("UPDATE debts SET installment_amount = ? WHERE id = ?")
        .bind(debt.installment_amount.to_string())
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(Some(debt))
}

/*========== Delete ========== */

pub async fn delete_debt(pool: &Pool<Sqlite>, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM debts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
