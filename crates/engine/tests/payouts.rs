use chrono::{TimeZone, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection};

use engine::{
    AppPayment, AppStatus, Engine, EngineError, MoneyCents, PartnerPayment, ShareBps, Split,
    UnmarkOutcome, app_payments, payments,
};
use migration::MigratorTrait;
use uuid::Uuid;

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

fn split(partner_bps: u16, owner_bps: u16) -> Split {
    Split::validated(
        ShareBps::new(partner_bps).unwrap(),
        ShareBps::new(owner_bps).unwrap(),
    )
    .unwrap()
}

/// Partner at 25/75 with one assigned client named "Acme".
async fn quarter_split_setup(engine: &Engine) -> (Uuid, Uuid) {
    let partner = engine
        .new_partner("Dana", None, Some(split(2_500, 7_500)), None)
        .await
        .unwrap();
    let client = engine.new_client("Acme", None, None).await.unwrap();
    engine
        .assign_client(client, partner, None, None)
        .await
        .unwrap();
    (partner, client)
}

#[tokio::test]
async fn mark_creates_aggregate_payment_and_audit_rows() {
    let (engine, _db) = engine_with_db().await;
    let (partner, client) = quarter_split_setup(&engine).await;

    let completed = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
    let app_a = engine
        .new_client_app(client, "Shop", MoneyCents::new(1_000), Some(completed))
        .await
        .unwrap();
    let app_b = engine
        .new_client_app(client, "Tracker", MoneyCents::new(1_500), Some(completed))
        .await
        .unwrap();

    let paid_at = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
    let payment_id = engine
        .mark_apps_paid(partner, &[app_a, app_b], paid_at)
        .await
        .unwrap();

    // 25% of €10.00 + 25% of €15.00 = €6.25, one aggregate row.
    let paid = engine.list_partner_payments(partner).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].id, payment_id);
    assert_eq!(paid[0].amount, MoneyCents::new(625));
    let note = paid[0].note.as_deref().unwrap();
    assert!(note.starts_with("Payment for Acme, Acme ["));
    assert!(note.contains(&app_a.to_string()));
    assert!(note.contains(&app_b.to_string()));

    let audits = engine.list_app_payments(partner).await.unwrap();
    assert_eq!(audits.len(), 2);
    assert!(audits.iter().all(|row| row.payment_id == Some(payment_id)));
    assert_eq!(
        audits.iter().map(|row| row.amount).sum::<MoneyCents>(),
        MoneyCents::new(625)
    );

    let apps = engine.list_client_apps(client).await.unwrap();
    assert!(apps.iter().all(|app| app.status == AppStatus::Paid));
}

#[tokio::test]
async fn unmark_reduces_then_deletes_the_aggregate() {
    let (engine, _db) = engine_with_db().await;
    let (partner, client) = quarter_split_setup(&engine).await;

    let app_a = engine
        .new_client_app(client, "Shop", MoneyCents::new(1_000), None)
        .await
        .unwrap();
    let app_b = engine
        .new_client_app(client, "Tracker", MoneyCents::new(1_500), None)
        .await
        .unwrap();
    let payment_id = engine
        .mark_apps_paid(partner, &[app_a, app_b], Utc::now())
        .await
        .unwrap();

    let outcome = engine.unmark_app_paid(partner, app_a).await.unwrap();
    assert_eq!(
        outcome,
        UnmarkOutcome::PaymentReduced {
            payment_id,
            remaining_amount: MoneyCents::new(375),
        }
    );

    let paid = engine.list_partner_payments(partner).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].amount, MoneyCents::new(375));
    let note = paid[0].note.as_deref().unwrap();
    assert!(!note.contains(&app_a.to_string()));
    assert!(note.contains(&app_b.to_string()));

    let apps = engine.list_client_apps(client).await.unwrap();
    let row_a = apps.iter().find(|app| app.id == app_a).unwrap();
    assert_eq!(row_a.status, AppStatus::Completed);
    assert_eq!(engine.list_app_payments(partner).await.unwrap().len(), 1);

    // Unmarking the last covered row removes the aggregate entirely.
    let outcome = engine.unmark_app_paid(partner, app_b).await.unwrap();
    assert_eq!(outcome, UnmarkOutcome::PaymentDeleted { payment_id });
    assert!(engine.list_partner_payments(partner).await.unwrap().is_empty());
    assert!(engine.list_app_payments(partner).await.unwrap().is_empty());
}

#[tokio::test]
async fn mark_then_unmark_allows_marking_again() {
    let (engine, _db) = engine_with_db().await;
    let (partner, client) = quarter_split_setup(&engine).await;

    let app = engine
        .new_client_app(client, "Shop", MoneyCents::new(1_000), None)
        .await
        .unwrap();
    engine
        .mark_apps_paid(partner, &[app], Utc::now())
        .await
        .unwrap();
    engine.unmark_app_paid(partner, app).await.unwrap();
    engine
        .mark_apps_paid(partner, &[app], Utc::now())
        .await
        .unwrap();

    let paid = engine.list_partner_payments(partner).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].amount, MoneyCents::new(250));
}

#[tokio::test]
async fn mark_rejects_already_paid_and_duplicate_selection() {
    let (engine, _db) = engine_with_db().await;
    let (partner, client) = quarter_split_setup(&engine).await;

    let app = engine
        .new_client_app(client, "Shop", MoneyCents::new(1_000), None)
        .await
        .unwrap();

    let err = engine
        .mark_apps_paid(partner, &[app, app], Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    engine
        .mark_apps_paid(partner, &[app], Utc::now())
        .await
        .unwrap();
    let err = engine
        .mark_apps_paid(partner, &[app], Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // A failed batch must not settle anything (transactional).
    assert_eq!(engine.list_partner_payments(partner).await.unwrap().len(), 1);
}

#[tokio::test]
async fn mark_rejects_unassigned_client() {
    let (engine, _db) = engine_with_db().await;
    let partner = engine
        .new_partner("Dana", None, Some(split(2_500, 7_500)), None)
        .await
        .unwrap();
    let stranger = engine.new_client("Stray", None, None).await.unwrap();
    let app = engine
        .new_client_app(stranger, "Shop", MoneyCents::new(1_000), None)
        .await
        .unwrap();

    let err = engine
        .mark_apps_paid(partner, &[app], Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(engine.list_partner_payments(partner).await.unwrap().is_empty());
}

#[tokio::test]
async fn app_split_pin_beats_assignment_override() {
    let (engine, _db) = engine_with_db().await;
    let partner = engine
        .new_partner("Dana", None, Some(split(2_500, 7_500)), None)
        .await
        .unwrap();
    let client = engine.new_client("Acme", None, None).await.unwrap();
    engine
        .assign_client(client, partner, Some(split(4_000, 6_000)), None)
        .await
        .unwrap();

    let app = engine
        .new_client_app(client, "Shop", MoneyCents::new(10_000), None)
        .await
        .unwrap();
    engine
        .set_app_split(partner, app, split(5_000, 5_000))
        .await
        .unwrap();

    engine
        .mark_apps_paid(partner, &[app], Utc::now())
        .await
        .unwrap();
    let paid = engine.list_partner_payments(partner).await.unwrap();
    // Pin (50%) wins over the assignment override (40%).
    assert_eq!(paid[0].amount, MoneyCents::new(5_000));
}

#[tokio::test]
async fn unmark_falls_back_to_note_matching_for_legacy_rows() {
    let (engine, db) = engine_with_db().await;
    let (partner, client) = quarter_split_setup(&engine).await;

    let app = engine
        .new_client_app(client, "Shop", MoneyCents::new(1_000), None)
        .await
        .unwrap();

    // Legacy shape: audit row without a payment link, aggregate identified
    // only by its "Payment for {app}, {client}" note.
    let paid_at = Utc.with_ymd_and_hms(2025, 11, 2, 10, 0, 0).unwrap();
    let legacy_payment = PartnerPayment::new(
        partner,
        MoneyCents::new(250),
        Some("Payment for Shop, Acme".to_string()),
        paid_at,
    );
    let legacy_payment_id = legacy_payment.id;
    payments::ActiveModel::from(&legacy_payment)
        .insert(&db)
        .await
        .unwrap();
    let audit = AppPayment::new(partner, app, None, MoneyCents::new(250), paid_at);
    app_payments::ActiveModel::from(&audit)
        .insert(&db)
        .await
        .unwrap();

    let outcome = engine.unmark_app_paid(partner, app).await.unwrap();
    assert_eq!(
        outcome,
        UnmarkOutcome::PaymentDeleted {
            payment_id: legacy_payment_id,
        }
    );
    assert!(engine.list_partner_payments(partner).await.unwrap().is_empty());
}

#[tokio::test]
async fn unmark_falls_back_to_client_name_when_note_is_freeform() {
    let (engine, db) = engine_with_db().await;
    let (partner, client) = quarter_split_setup(&engine).await;

    let app = engine
        .new_client_app(client, "Shop", MoneyCents::new(1_000), None)
        .await
        .unwrap();

    let paid_at = Utc::now();
    let legacy_payment = PartnerPayment::new(
        partner,
        MoneyCents::new(500),
        Some("Payment for Acme, Globex".to_string()),
        paid_at,
    );
    let legacy_payment_id = legacy_payment.id;
    payments::ActiveModel::from(&legacy_payment)
        .insert(&db)
        .await
        .unwrap();
    let audit = AppPayment::new(partner, app, None, MoneyCents::new(250), paid_at);
    app_payments::ActiveModel::from(&audit)
        .insert(&db)
        .await
        .unwrap();

    let outcome = engine.unmark_app_paid(partner, app).await.unwrap();
    // Two names in the note, so the aggregate survives reduced.
    assert_eq!(
        outcome,
        UnmarkOutcome::PaymentReduced {
            payment_id: legacy_payment_id,
            remaining_amount: MoneyCents::new(250),
        }
    );
    let paid = engine.list_partner_payments(partner).await.unwrap();
    assert_eq!(paid[0].note.as_deref(), Some("Payment for Globex"));
}

#[tokio::test]
async fn unmark_with_no_matching_payment_still_clears_the_audit_row() {
    let (engine, db) = engine_with_db().await;
    let (partner, client) = quarter_split_setup(&engine).await;

    let app = engine
        .new_client_app(client, "Shop", MoneyCents::new(1_000), None)
        .await
        .unwrap();
    let audit = AppPayment::new(partner, app, None, MoneyCents::new(250), Utc::now());
    app_payments::ActiveModel::from(&audit)
        .insert(&db)
        .await
        .unwrap();

    let outcome = engine.unmark_app_paid(partner, app).await.unwrap();
    assert_eq!(outcome, UnmarkOutcome::PaymentNotFound);
    assert!(engine.list_app_payments(partner).await.unwrap().is_empty());
}

#[tokio::test]
async fn breakdown_and_balance_track_completed_rows_and_payouts() {
    let (engine, _db) = engine_with_db().await;
    let partner = engine
        .new_partner("Dana", None, Some(split(3_000, 7_000)), None)
        .await
        .unwrap();
    let client = engine.new_client("Acme", None, None).await.unwrap();
    engine
        .assign_client(client, partner, None, None)
        .await
        .unwrap();
    let app = engine
        .new_client_app(client, "Shop", MoneyCents::new(10_000), None)
        .await
        .unwrap();

    let breakdown = engine.partner_breakdown(partner).await.unwrap();
    assert_eq!(breakdown.len(), 1);
    assert_eq!(breakdown[0].total_profit, MoneyCents::new(10_000));
    assert_eq!(breakdown[0].partner_share, MoneyCents::new(3_000));
    assert_eq!(breakdown[0].owner_share, MoneyCents::new(7_000));
    assert!(!breakdown[0].has_override);

    let balance = engine.partner_balance(partner).await.unwrap();
    assert_eq!(balance.partner_share, MoneyCents::new(3_000));
    assert_eq!(balance.balance, MoneyCents::new(3_000));

    // A payout flips the row to paid and zeroes the outstanding balance.
    engine
        .mark_apps_paid(partner, &[app], Utc::now())
        .await
        .unwrap();
    let balance = engine.partner_balance(partner).await.unwrap();
    assert_eq!(balance.partner_share, MoneyCents::ZERO);
    assert_eq!(balance.total_paid, MoneyCents::new(3_000));
    assert_eq!(balance.balance, MoneyCents::new(-3_000));
}

#[tokio::test]
async fn monthly_series_buckets_by_completion_month() {
    let (engine, _db) = engine_with_db().await;
    let (partner, client) = quarter_split_setup(&engine).await;

    let march = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
    let may = Utc.with_ymd_and_hms(2026, 5, 20, 0, 0, 0).unwrap();
    engine
        .new_client_app(client, "Shop", MoneyCents::new(1_000), Some(march))
        .await
        .unwrap();
    engine
        .new_client_app(client, "Tracker", MoneyCents::new(2_000), Some(may))
        .await
        .unwrap();

    let series = engine.partner_monthly_series(partner).await.unwrap();
    let points: Vec<_> = series.iter().collect();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].month, "2026-03");
    assert_eq!(points[0].amount, MoneyCents::new(250));
    assert_eq!(points[1].month, "2026-05");
    assert_eq!(points[1].amount, MoneyCents::new(500));
}

#[tokio::test]
async fn manual_payment_requires_positive_amount() {
    let (engine, _db) = engine_with_db().await;
    let (partner, _client) = quarter_split_setup(&engine).await;

    let err = engine
        .record_partner_payment(partner, MoneyCents::ZERO, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    engine
        .record_partner_payment(partner, MoneyCents::new(1_000), Some("advance"), Utc::now())
        .await
        .unwrap();
    let paid = engine.list_partner_payments(partner).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].note.as_deref(), Some("advance"));
}
