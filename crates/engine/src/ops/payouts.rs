//! Mark-as-paid / unmark reconciliation.
//!
//! Marking settles one or more completed app rows: one audit row per app in
//! `partner_payments_by_client_app` (linked via `payment_id`) plus a single
//! aggregate `partner_payments` row for the batch, its note suffixed with the
//! bracketed app-row ids. Unmarking reverses one app row, reducing or
//! deleting the aggregate.
//!
//! Each sequence runs inside one database transaction, so a failure partway
//! through rolls back instead of leaving orphaned audit rows.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    AppPayment, AppStatus, ClientApp, EngineError, MoneyCents, PartnerPayment, ResultEngine,
    app_payments, app_splits, assignments, client_apps, payments,
    reconcile::{self, MatchStrategy},
    split::resolve_split,
};

use super::{Engine, normalize_optional_text, with_tx};

/// What happened to the aggregate payment during an unmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnmarkOutcome {
    /// The aggregate covered other rows too; its amount and note were
    /// reduced.
    PaymentReduced {
        payment_id: Uuid,
        remaining_amount: MoneyCents,
    },
    /// The aggregate covered only this row and was deleted.
    PaymentDeleted { payment_id: Uuid },
    /// No aggregate payment could be located (legacy data with an
    /// unrecognizable note); the audit row was still removed.
    PaymentNotFound,
}

impl Engine {
    /// Settle one or more completed app rows for a partner.
    ///
    /// Every row must be `completed` and belong to a client assigned to the
    /// partner. Returns the id of the aggregate payment created for the
    /// batch.
    pub async fn mark_apps_paid(
        &self,
        partner_id: Uuid,
        app_ids: &[Uuid],
        paid_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        if app_ids.is_empty() {
            return Err(EngineError::InvalidAmount(
                "no app rows selected".to_string(),
            ));
        }
        let unique: HashSet<Uuid> = app_ids.iter().copied().collect();
        if unique.len() != app_ids.len() {
            return Err(EngineError::InvalidAmount(
                "duplicate app rows in selection".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let partner = self.require_partner(&db_tx, partner_id).await?;

            let assignment_models = assignments::Entity::find()
                .filter(assignments::Column::PartnerId.eq(partner_id))
                .all(&db_tx)
                .await?;
            let mut assignment_by_client = HashMap::new();
            for model in assignment_models {
                let assignment = crate::Assignment::try_from(model)?;
                assignment_by_client.insert(assignment.client_id, assignment);
            }

            let mut total = MoneyCents::ZERO;
            let mut names: Vec<String> = Vec::with_capacity(app_ids.len());
            let mut settled: Vec<(ClientApp, MoneyCents)> = Vec::with_capacity(app_ids.len());

            for app_id in app_ids {
                let app_model = client_apps::Entity::find_by_id(*app_id)
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| {
                        EngineError::KeyNotFound("client app not exists".to_string())
                    })?;
                let app = ClientApp::try_from(app_model)?;

                if app.status != AppStatus::Completed {
                    return Err(EngineError::InvalidAmount(format!(
                        "app '{}' is not completed",
                        app.app_name
                    )));
                }
                let assignment = assignment_by_client.get(&app.client_id).ok_or_else(|| {
                    EngineError::KeyNotFound("client not assigned to partner".to_string())
                })?;

                let app_split = app_splits::Entity::find()
                    .filter(app_splits::Column::PartnerId.eq(partner_id))
                    .filter(app_splits::Column::ClientAppId.eq(app.id))
                    .one(&db_tx)
                    .await?
                    .map(crate::PartnerAppSplit::try_from)
                    .transpose()?
                    .map(|pin| pin.split);

                let split = resolve_split(&partner, Some(assignment), app_split);
                let share = app.profit_us.share(split.partner);

                let client = self.require_client(&db_tx, app.client_id).await?;
                names.push(client.name);
                total = total
                    .checked_add(share)
                    .ok_or_else(|| EngineError::InvalidAmount("amount overflow".to_string()))?;
                settled.push((app, share));
            }

            let note = reconcile::payout_note(&names, app_ids);
            let payment = PartnerPayment::new(partner_id, total, Some(note), paid_at);
            let payment_id = payment.id;
            payments::ActiveModel::from(&payment).insert(&db_tx).await?;

            for (app, share) in &settled {
                let audit =
                    AppPayment::new(partner_id, app.id, Some(payment_id), *share, paid_at);
                app_payments::ActiveModel::from(&audit).insert(&db_tx).await?;

                let active = client_apps::ActiveModel {
                    id: ActiveValue::Set(app.id),
                    status: ActiveValue::Set(AppStatus::Paid.as_str().to_string()),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }

            tracing::info!(
                %partner_id,
                %payment_id,
                rows = settled.len(),
                amount = %total,
                "marked app rows paid"
            );
            Ok(payment_id)
        })
    }

    /// Reverse the payout of one app row.
    ///
    /// The aggregate payment is located through the `payment_id` join when
    /// present, falling back to the note heuristics for legacy audit rows.
    /// The audit row is always deleted and the app row returns to
    /// `completed`.
    pub async fn unmark_app_paid(
        &self,
        partner_id: Uuid,
        app_id: Uuid,
    ) -> ResultEngine<UnmarkOutcome> {
        with_tx!(self, |db_tx| {
            let audit_model = app_payments::Entity::find()
                .filter(app_payments::Column::PartnerId.eq(partner_id))
                .filter(app_payments::Column::ClientAppId.eq(app_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("app payment not exists".to_string())
                })?;
            let audit = AppPayment::from(audit_model);

            let app_model = client_apps::Entity::find_by_id(app_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("client app not exists".to_string()))?;
            let app = ClientApp::try_from(app_model)?;
            let client = self.require_client(&db_tx, app.client_id).await?;

            let matched = self
                .locate_aggregate(&db_tx, partner_id, &audit, &app, &client.name)
                .await?;

            let outcome = match matched {
                None => {
                    tracing::warn!(%partner_id, %app_id, "no aggregate payment found for unmark");
                    UnmarkOutcome::PaymentNotFound
                }
                Some((payment, strategy)) => {
                    let covers_others = self
                        .aggregate_covers_other_rows(&db_tx, &payment, audit.id, strategy)
                        .await?;
                    tracing::debug!(
                        %partner_id,
                        %app_id,
                        payment_id = %payment.id,
                        ?strategy,
                        covers_others,
                        "unmarking app row"
                    );

                    if covers_others {
                        let remaining = payment.amount - audit.amount;
                        let note = payment
                            .note
                            .as_deref()
                            .map(|note| reconcile::note_without_entry(note, app_id, &client.name));
                        let active = payments::ActiveModel {
                            id: ActiveValue::Set(payment.id),
                            amount_cents: ActiveValue::Set(remaining.cents()),
                            note: ActiveValue::Set(note),
                            ..Default::default()
                        };
                        active.update(&db_tx).await?;
                        UnmarkOutcome::PaymentReduced {
                            payment_id: payment.id,
                            remaining_amount: remaining,
                        }
                    } else {
                        // Audit row goes first so the FK cascade cannot race
                        // the explicit delete.
                        app_payments::Entity::delete_by_id(audit.id)
                            .exec(&db_tx)
                            .await?;
                        payments::Entity::delete_by_id(payment.id)
                            .exec(&db_tx)
                            .await?;
                        UnmarkOutcome::PaymentDeleted {
                            payment_id: payment.id,
                        }
                    }
                }
            };

            if !matches!(outcome, UnmarkOutcome::PaymentDeleted { .. }) {
                app_payments::Entity::delete_by_id(audit.id)
                    .exec(&db_tx)
                    .await?;
            }

            let active = client_apps::ActiveModel {
                id: ActiveValue::Set(app_id),
                status: ActiveValue::Set(AppStatus::Completed.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            Ok(outcome)
        })
    }

    /// Record a manual aggregate payment to a partner (not linked to app
    /// rows).
    pub async fn record_partner_payment(
        &self,
        partner_id: Uuid,
        amount: MoneyCents,
        note: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            self.require_partner(&db_tx, partner_id).await?;
            let payment = PartnerPayment::new(partner_id, amount, note, paid_at);
            let id = payment.id;
            payments::ActiveModel::from(&payment).insert(&db_tx).await?;
            Ok(id)
        })
    }

    pub async fn list_partner_payments(
        &self,
        partner_id: Uuid,
    ) -> ResultEngine<Vec<PartnerPayment>> {
        let models = payments::Entity::find()
            .filter(payments::Column::PartnerId.eq(partner_id))
            .order_by_asc(payments::Column::PaidAt)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(PartnerPayment::from).collect())
    }

    pub async fn list_app_payments(&self, partner_id: Uuid) -> ResultEngine<Vec<AppPayment>> {
        let models = app_payments::Entity::find()
            .filter(app_payments::Column::PartnerId.eq(partner_id))
            .order_by_asc(app_payments::Column::PaidAt)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(AppPayment::from).collect())
    }

    async fn locate_aggregate(
        &self,
        db_tx: &DatabaseTransaction,
        partner_id: Uuid,
        audit: &AppPayment,
        app: &ClientApp,
        client_name: &str,
    ) -> ResultEngine<Option<(PartnerPayment, MatchStrategy)>> {
        if let Some(payment_id) = audit.payment_id {
            let model = payments::Entity::find_by_id(payment_id)
                .one(db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("partner payment not exists".to_string())
                })?;
            // The join column is exact; report it as the id-based strategy.
            return Ok(Some((PartnerPayment::from(model), MatchStrategy::BracketId)));
        }

        let candidates: Vec<PartnerPayment> = payments::Entity::find()
            .filter(payments::Column::PartnerId.eq(partner_id))
            .order_by_asc(payments::Column::PaidAt)
            .all(db_tx)
            .await?
            .into_iter()
            .map(PartnerPayment::from)
            .collect();

        Ok(
            reconcile::match_settling_payment(&candidates, app.id, &app.app_name, client_name)
                .map(|(payment, strategy)| (payment.clone(), strategy)),
        )
    }

    /// Whether the aggregate payment still settles audit rows other than
    /// `audit_id`. For legacy aggregates with no joined rows, falls back to
    /// counting the names in the note.
    async fn aggregate_covers_other_rows(
        &self,
        db_tx: &DatabaseTransaction,
        payment: &PartnerPayment,
        audit_id: Uuid,
        strategy: MatchStrategy,
    ) -> ResultEngine<bool> {
        let linked = app_payments::Entity::find()
            .filter(app_payments::Column::PaymentId.eq(payment.id))
            .all(db_tx)
            .await?;
        if !linked.is_empty() {
            return Ok(linked.iter().any(|row| row.id != audit_id));
        }

        // A reconstructed "Payment for {app}, {client}" note describes a
        // single settled row even though it holds two comma-separated tokens.
        if strategy == MatchStrategy::ReconstructedNote {
            return Ok(false);
        }

        let Some(note) = payment.note.as_deref() else {
            return Ok(false);
        };
        if let Some(ids) = reconcile::note_ids(note) {
            return Ok(ids.len() > 1);
        }
        Ok(reconcile::note_names(note).len() > 1)
    }
}
