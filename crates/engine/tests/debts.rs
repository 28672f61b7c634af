use chrono::Utc;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    BUSINESS_CREDITOR, DebtKind, DebtStatus, Engine, EngineError, MoneyCents, PaymentRecipient,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

#[tokio::test]
async fn referral_debt_moves_through_partial_to_settled() {
    let (engine, _db) = engine_with_db().await;
    let debt = engine
        .new_debt(
            DebtKind::Referral,
            "Acme",
            "Dana",
            MoneyCents::new(10_000),
            Some("finder's fee"),
            None,
            Utc::now(),
        )
        .await
        .unwrap();

    let (view, totals) = engine.debt_view(debt).await.unwrap();
    assert_eq!(view.status, DebtStatus::Open);
    assert_eq!(totals.remaining, MoneyCents::new(10_000));
    assert_eq!(totals.paid, MoneyCents::ZERO);

    engine
        .record_debt_payment(debt, MoneyCents::new(4_000), None, None, Utc::now())
        .await
        .unwrap();
    let (view, totals) = engine.debt_view(debt).await.unwrap();
    assert_eq!(view.status, DebtStatus::Partial);
    assert_eq!(totals.remaining, MoneyCents::new(6_000));

    engine
        .record_debt_payment(debt, MoneyCents::new(6_000), None, None, Utc::now())
        .await
        .unwrap();
    let (view, totals) = engine.debt_view(debt).await.unwrap();
    assert_eq!(view.status, DebtStatus::Settled);
    assert_eq!(totals.remaining, MoneyCents::ZERO);
    assert_eq!(totals.surplus, MoneyCents::ZERO);
}

#[tokio::test]
async fn referral_debt_rejects_overpayment_without_writing() {
    let (engine, _db) = engine_with_db().await;
    let debt = engine
        .new_debt(
            DebtKind::Referral,
            "Acme",
            "Dana",
            MoneyCents::new(5_000),
            None,
            None,
            Utc::now(),
        )
        .await
        .unwrap();

    let err = engine
        .record_debt_payment(debt, MoneyCents::new(5_001), None, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::PaymentExceedsRemaining(_)));

    // Rejected before any insert: the ledger stays empty and status Open.
    assert!(engine.list_debt_payments(debt).await.unwrap().is_empty());
    let (view, _totals) = engine.debt_view(debt).await.unwrap();
    assert_eq!(view.status, DebtStatus::Open);
}

#[tokio::test]
async fn deposit_debt_accepts_overpayment_as_surplus() {
    let (engine, _db) = engine_with_db().await;
    let debt = engine
        .new_debt(
            DebtKind::Deposit,
            "Acme",
            "ignored",
            MoneyCents::new(10_000),
            None,
            Some("Dana"),
            Utc::now(),
        )
        .await
        .unwrap();

    // Deposits are always owed to the business.
    let (view, _totals) = engine.debt_view(debt).await.unwrap();
    assert_eq!(view.creditor, BUSINESS_CREDITOR);
    assert_eq!(view.assignee.as_deref(), Some("Dana"));

    engine
        .record_debt_payment(debt, MoneyCents::new(12_500), None, None, Utc::now())
        .await
        .unwrap();
    let (view, totals) = engine.debt_view(debt).await.unwrap();
    assert_eq!(view.status, DebtStatus::Settled);
    assert_eq!(totals.remaining, MoneyCents::ZERO);
    assert_eq!(totals.surplus, MoneyCents::new(2_500));
    assert_eq!(totals.total, MoneyCents::new(12_500));
}

#[tokio::test]
async fn settle_inserts_the_remaining_balance_as_final_payment() {
    let (engine, _db) = engine_with_db().await;
    let debt = engine
        .new_debt(
            DebtKind::Referral,
            "Acme",
            "Dana",
            MoneyCents::new(10_000),
            None,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
    engine
        .record_debt_payment(debt, MoneyCents::new(3_000), None, None, Utc::now())
        .await
        .unwrap();

    let final_payment = engine
        .settle_debt(debt, Some("bank transfer"), Utc::now())
        .await
        .unwrap();
    assert!(final_payment.is_some());

    let (view, totals) = engine.debt_view(debt).await.unwrap();
    assert_eq!(view.status, DebtStatus::Settled);
    assert_eq!(totals.paid, MoneyCents::new(10_000));
    assert_eq!(totals.remaining, MoneyCents::ZERO);

    let ledger = engine.list_debt_payments(debt).await.unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[1].amount, MoneyCents::new(7_000));
    assert_eq!(ledger[1].notes.as_deref(), Some("Final settlement"));
    assert_eq!(ledger[1].recipient.as_deref(), Some("bank transfer"));

    // Settling again is a no-op with no extra payment.
    let again = engine.settle_debt(debt, None, Utc::now()).await.unwrap();
    assert!(again.is_none());
    assert_eq!(engine.list_debt_payments(debt).await.unwrap().len(), 2);
}

#[tokio::test]
async fn new_debt_rejects_non_positive_base() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .new_debt(
            DebtKind::Referral,
            "Acme",
            "Dana",
            MoneyCents::ZERO,
            None,
            None,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn list_debts_unifies_both_kinds_with_totals() {
    let (engine, _db) = engine_with_db().await;
    let referral = engine
        .new_debt(
            DebtKind::Referral,
            "Acme",
            "Dana",
            MoneyCents::new(5_000),
            None,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
    engine
        .new_debt(
            DebtKind::Deposit,
            "Globex",
            "unused",
            MoneyCents::new(20_000),
            None,
            None,
            Utc::now(),
        )
        .await
        .unwrap();
    engine
        .record_debt_payment(referral, MoneyCents::new(2_000), None, None, Utc::now())
        .await
        .unwrap();

    let debts = engine.list_debts().await.unwrap();
    assert_eq!(debts.len(), 2);
    let (_, referral_totals) = debts
        .iter()
        .find(|(debt, _)| debt.kind == DebtKind::Referral)
        .unwrap();
    assert_eq!(referral_totals.remaining, MoneyCents::new(3_000));
    let (deposit, deposit_totals) = debts
        .iter()
        .find(|(debt, _)| debt.kind == DebtKind::Deposit)
        .unwrap();
    assert_eq!(deposit.creditor, BUSINESS_CREDITOR);
    assert_eq!(deposit_totals.remaining, MoneyCents::new(20_000));
}

#[tokio::test]
async fn payment_recipients_are_deduplicated_suggestions() {
    let (engine, _db) = engine_with_db().await;
    let first = engine.add_payment_recipient("Revolut").await.unwrap();
    let second = engine.add_payment_recipient("  Revolut ").await.unwrap();
    assert_eq!(first, second);

    engine.add_payment_recipient("Cash").await.unwrap();
    let labels: Vec<String> = engine
        .list_payment_recipients()
        .await
        .unwrap()
        .into_iter()
        .map(|PaymentRecipient { label, .. }| label)
        .collect();
    assert_eq!(labels, vec!["Cash".to_string(), "Revolut".to_string()]);
}
