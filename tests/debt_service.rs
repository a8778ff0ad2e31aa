use debt_tracker::database::db::{connection, migrate};
use debt_tracker::database::models::{DebtPatch, DebtQuery, DebtStatus};
use debt_tracker::debts::{CreateDebt, DebtService};
use debt_tracker::error::DebtError;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).expect("decimal literal")
}

async fn service() -> DebtService {
    let pool = connection::memory_pool().await.expect("memory pool");
    migrate::run_migrations(&pool).await.expect("migrations");
    DebtService::new(pool)
}

fn car_loan() -> CreateDebt {
    CreateDebt {
        description: "Car loan".to_string(),
        amount: dec("1200.00"),
        installments: Some(12),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_then_delete_round_trip() {
    let svc = service().await;

    let debt = svc.create(car_loan()).await.expect("create");
    assert_eq!(debt.installment_amount, dec("100.00"));
    assert_eq!(debt.status, DebtStatus::Pending);
    assert!(!debt.id.is_empty());

    let listed = svc.list(&DebtQuery::default()).await.expect("list");
    assert!(listed.iter().any(|d| d.id == debt.id));

    svc.remove(&debt.id).await.expect("remove");
    let listed = svc.list(&DebtQuery::default()).await.expect("list");
    assert!(listed.iter().all(|d| d.id != debt.id));
}

#[tokio::test]
async fn caller_supplied_id_is_kept() {
    let svc = service().await;
    let debt = svc
        .create(CreateDebt {
            id: Some("client-id-1".to_string()),
            ..car_loan()
        })
        .await
        .expect("create");
    assert_eq!(debt.id, "client-id-1");

    let err = svc
        .create(CreateDebt {
            id: Some("client-id-1".to_string()),
            ..car_loan()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DebtError::Storage(_)));
}

#[tokio::test]
async fn create_from_quota_derives_installments() {
    let svc = service().await;
    let debt = svc
        .create(CreateDebt {
            description: "Laptop plan".to_string(),
            amount: dec("900"),
            installment_amount: Some(dec("300")),
            ..Default::default()
        })
        .await
        .expect("create");
    assert_eq!(debt.installments, 3);
    assert_eq!(debt.installment_amount, dec("300"));
}

#[tokio::test]
async fn invalid_create_writes_nothing() {
    let svc = service().await;
    let err = svc
        .create(CreateDebt {
            description: "Car".to_string(),
            amount: dec("10.999"),
            installments: Some(2),
            ..Default::default()
        })
        .await
        .unwrap_err();
    let issues = err.validation().expect("validation error");
    assert!(issues.for_field("description").is_some());
    assert!(issues.for_field("amount").is_some());

    let err = svc
        .create(CreateDebt {
            description: "No plan given".to_string(),
            amount: dec("10"),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.validation().and_then(|v| v.for_field("installments")).is_some());

    assert!(svc.list(&DebtQuery::default()).await.expect("list").is_empty());
}

#[tokio::test]
async fn updates_recompute_installment_amount() {
    let svc = service().await;
    let debt = svc.create(car_loan()).await.expect("create");

    let updated = svc
        .update(&debt.id, DebtPatch { amount: Some(dec("1000")), ..Default::default() })
        .await
        .expect("update amount");
    assert_eq!(updated.installment_amount, dec("83.33"));

    let updated = svc
        .update(&debt.id, DebtPatch { installments: Some(4), ..Default::default() })
        .await
        .expect("update installments");
    assert_eq!(updated.installment_amount, dec("250"));

    let updated = svc
        .update(&debt.id, DebtPatch { installments: Some(0), ..Default::default() })
        .await
        .expect("update to zero");
    assert_eq!(updated.installment_amount, updated.amount);

    let stored = svc.get(&debt.id).await.expect("get");
    assert_eq!(stored, updated);
    assert_eq!(stored.created_at, debt.created_at);
}

#[tokio::test]
async fn rejected_update_leaves_row_untouched() {
    let svc = service().await;
    let debt = svc.create(car_loan()).await.expect("create");

    let err = svc
        .update(
            &debt.id,
            DebtPatch {
                description: Some("x".to_string()),
                amount: Some(dec("5")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.validation().is_some());
    assert_eq!(svc.get(&debt.id).await.expect("get"), debt);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let svc = service().await;
    assert!(matches!(svc.get("nope").await, Err(DebtError::NotFound(_))));
    assert!(matches!(svc.pay("nope").await, Err(DebtError::NotFound(_))));
    assert!(matches!(svc.remove("nope").await, Err(DebtError::NotFound(_))));
    assert!(matches!(
        svc.update("nope", DebtPatch::default()).await,
        Err(DebtError::NotFound(_))
    ));
}

#[tokio::test]
async fn pay_and_partial_pay() {
    let svc = service().await;
    let debt = svc.create(car_loan()).await.expect("create");

    let err = svc.partial_pay(&debt.id, dec("1500")).await.unwrap_err();
    assert_eq!(
        err.validation().and_then(|v| v.for_field("amount")),
        Some("The amount should be less than the total")
    );

    let partly = svc.partial_pay(&debt.id, dec("600")).await.expect("partial");
    assert_eq!(partly.amount, dec("600"));
    assert_eq!(partly.installments, 12);
    assert_eq!(partly.installment_amount, dec("50"));
    assert_eq!(partly.status, DebtStatus::Pending);

    let settled = svc.partial_pay(&debt.id, dec("600")).await.expect("settle");
    assert!(settled.amount.is_zero());
    assert_eq!(settled.status, DebtStatus::Paid);

    let other = svc.create(car_loan()).await.expect("create");
    let paid = svc.pay(&other.id).await.expect("pay");
    assert_eq!(paid.status, DebtStatus::Paid);
    assert_eq!(paid.amount, other.amount);
}

#[tokio::test]
async fn paid_debt_rejects_partial_payment() {
    let svc = service().await;
    let debt = svc.create(car_loan()).await.expect("create");
    svc.pay(&debt.id).await.expect("pay");

    let err = svc.partial_pay(&debt.id, dec("100")).await.unwrap_err();
    assert_eq!(
        err.validation().and_then(|v| v.for_field("amount")),
        Some("The debt is already paid")
    );

    let stored = svc.get(&debt.id).await.expect("get");
    assert_eq!(stored.status, DebtStatus::Paid);
    assert_eq!(stored.amount, dec("1200"));

    assert!(matches!(
        svc.partial_pay("no-such-id", dec("1")).await,
        Err(DebtError::NotFound(_))
    ));
}

#[tokio::test]
async fn empty_patch_returns_row_unchanged() {
    let svc = service().await;
    let debt = svc.create(car_loan()).await.expect("create");

    let same = svc.update(&debt.id, DebtPatch::default()).await.expect("update");
    assert_eq!(same, debt);
    assert!(matches!(
        svc.update("no-such-id", DebtPatch::default()).await,
        Err(DebtError::NotFound(_))
    ));
}

#[tokio::test]
async fn oversized_quota_division_is_a_validation_error() {
    let svc = service().await;
    let err = svc
        .create(CreateDebt {
            description: "Huge loan".to_string(),
            amount: dec("1000000000000000000000000000"),
            installment_amount: Some(dec("0.01")),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.validation().and_then(|v| v.for_field("installment_amount")).is_some());
    assert!(svc.list(&DebtQuery::default()).await.expect("list").is_empty());
}

#[tokio::test]
async fn strategy_over_huge_debts_does_not_panic() {
    let svc = service().await;
    for description in ["Huge loan one", "Huge loan two"] {
        svc.create(CreateDebt {
            description: description.to_string(),
            amount: dec("50000000000000000000000000000"),
            installments: Some(5),
            ..Default::default()
        })
        .await
        .expect("create");
    }

    let plan = svc.plan_strategy(dec("10")).await.expect("plan");
    assert_eq!(plan.allocations.len(), 1);
    assert_eq!(plan.preview.len(), 2);
}

#[tokio::test]
async fn list_filters_by_status_and_amount() {
    let svc = service().await;
    let small = svc
        .create(CreateDebt {
            description: "Phone bill".to_string(),
            amount: dec("80"),
            installments: Some(1),
            status: Some(DebtStatus::Overdue),
            ..Default::default()
        })
        .await
        .expect("create");
    let big = svc.create(car_loan()).await.expect("create");

    let overdue = svc
        .list(&DebtQuery { statuses: Some(vec![DebtStatus::Overdue]), ..Default::default() })
        .await
        .expect("list");
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, small.id);

    let ranged = svc
        .list(&DebtQuery { amount_min: Some(dec("100")), amount_max: Some(dec("5000")), ..Default::default() })
        .await
        .expect("list");
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].id, big.id);

    let none = svc
        .list(&DebtQuery { statuses: Some(vec![]), ..Default::default() })
        .await
        .expect("list");
    assert!(none.is_empty());
}

#[tokio::test]
async fn strategy_plan_is_not_persisted() {
    let svc = service().await;
    let car = svc.create(car_loan()).await.expect("create");
    let phone = svc
        .create(CreateDebt {
            description: "Phone bill".to_string(),
            amount: dec("80"),
            installments: Some(2),
            ..Default::default()
        })
        .await
        .expect("create");
    let paid = svc.create(car_loan()).await.expect("create");
    svc.pay(&paid.id).await.expect("pay");

    // car ranks first (100/1280 vs 40/1280): paid in full, 50 left for the phone
    let plan = svc.plan_strategy(dec("1250")).await.expect("plan");
    assert_eq!(plan.allocations.len(), 2);
    assert!(plan.allocations.iter().all(|a| a.debt_id != paid.id));

    let preview_car = plan.preview.iter().find(|d| d.id == car.id).expect("car in preview");
    assert_eq!(preview_car.status, DebtStatus::Paid);
    assert!(preview_car.amount.is_zero());
    let preview_phone = plan.preview.iter().find(|d| d.id == phone.id).expect("phone in preview");
    assert_eq!(preview_phone.amount, dec("30"));
    assert_eq!(preview_phone.installment_amount, dec("15"));

    assert_eq!(svc.get(&car.id).await.expect("get").amount, dec("1200"));
    assert_eq!(svc.get(&phone.id).await.expect("get").status, DebtStatus::Pending);

    assert!(svc.plan_strategy(dec("-1")).await.unwrap_err().validation().is_some());
}
