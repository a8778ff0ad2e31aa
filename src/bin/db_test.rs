use dotenvy::dotenv;
use debt_tracker::config::{log_warnings, AppConfig};
use debt_tracker::logging;
use debt_tracker::database::db::connection::get_db_pool;
use debt_tracker::database::db::{migrate, queries};
use debt_tracker::database::models::{DebtPatch, DebtQuery, DebtStatus, NewDebt};

use rust_decimal::Decimal;
use std::str::FromStr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    /* ==========Testing========== */
    let (config, warnings) = AppConfig::from_env();
    logging::init_tracing(config.log_json);
    log_warnings(&warnings);
    let pool = get_db_pool(&config).await?;

    migrate::run_migrations(&pool).await?;
    println!("Migrations ran successfully!");

    let debt_id = uuid::Uuid::new_v4().to_string();

    // ----------------------------------------------------
    // TEST：CREATE DEBT
    // ----------------------------------------------------
    println!("\n--- Testing: insert_debt ---");
    let created = queries::insert_debt(&pool, &NewDebt {
        id: debt_id.clone(),
        description: "Car loan".to_string(),
        amount: Decimal::from_str("1200.00")?,
        installments: 12,
        status: DebtStatus::Pending,
    })
    .await?;
    println!("   > Debt created: {:?}", created);
    assert_eq!(created.installment_amount, Decimal::from_str("100.00")?, "installment amount not derived");

    println!("\n--- Testing: get_debt ---");
    let fetched = queries::get_debt(&pool, &debt_id).await?;
    println!("   > Acquired debt: {:?}", fetched);
    assert!(fetched.is_some(), "debt not found after insert");

    // ----------------------------------------------------
    // TEST：UPDATE DEBT
    // ----------------------------------------------------
    println!("\n--- Testing: update_debt ---");
    let patch = DebtPatch {
        amount: Some(Decimal::from_str("600.00")?),
        installments: Some(4),
        ..Default::default()
    };
    let updated = queries::update_debt(&pool, &debt_id, &patch).await?
        .ok_or_else(|| anyhow::anyhow!("debt {debt_id} vanished"))?;
    println!("   > Updated debt: {:?}", updated);
    assert_eq!(updated.installment_amount, Decimal::from_str("150.00")?, "installment amount not recomputed");

    let zero = DebtPatch { installments: Some(0), ..Default::default() };
    let updated = queries::update_debt(&pool, &debt_id, &zero).await?
        .ok_or_else(|| anyhow::anyhow!("debt {debt_id} vanished"))?;
    assert_eq!(updated.installment_amount, updated.amount, "zero installments should owe the whole amount");

    println!("\n--- Testing: list_debts ---");
    let pending = queries::list_debts(&pool, &DebtQuery {
        statuses: Some(vec![DebtStatus::Pending]),
        ..Default::default()
    })
    .await?;
    println!("   > Pending debts: {}", pending.len());
    assert!(pending.iter().any(|d| d.id == debt_id), "pending filter lost the debt");

    // ----------------------------------------------------
    // TEST：DELETE DEBT
    // ----------------------------------------------------
    println!("\n--- Testing: delete_debt ---");
    let deleted = queries::delete_debt(&pool, &debt_id).await?;
    assert!(deleted, "Failed to delete debt!");
    let all = queries::list_debts(&pool, &DebtQuery::default()).await?;
    assert!(all.iter().all(|d| d.id != debt_id), "deleted debt still listed");

    println!("\nAll checks passed.");
    Ok(())
}
