//! Debt operations: creation, payments, settlement, derived views.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Debt, DebtKind, DebtPayment, DebtStatus, DebtTotals, EngineError, MoneyCents, ResultEngine,
    debt_payments, debt_totals, debts, validate_debt_payment,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Create a debt. Deposit debts are always credited to the business
    /// regardless of the `creditor` argument.
    pub async fn new_debt(
        &self,
        kind: DebtKind,
        debtor: &str,
        creditor: &str,
        base_amount: MoneyCents,
        description: Option<&str>,
        assignee: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        let debtor = normalize_required_name(debtor, "debtor")?;
        let creditor = normalize_required_name(creditor, "creditor")?;
        if !base_amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "debt base amount must be > 0".to_string(),
            ));
        }
        let debt = Debt::new(
            kind,
            debtor,
            creditor,
            base_amount,
            normalize_optional_text(description),
            normalize_optional_text(assignee),
            created_at,
        );
        let id = debt.id;
        with_tx!(self, |db_tx| {
            debts::ActiveModel::from(&debt).insert(&db_tx).await?;
            Ok::<(), EngineError>(())
        })?;
        tracing::debug!(debt_id = %id, kind = kind.as_str(), "created debt");
        Ok(id)
    }

    /// Apply a payment against a debt.
    ///
    /// Referral debts reject amounts above the remaining balance before any
    /// write; deposit debts accept unlimited overpayment (tracked as
    /// surplus). Status moves to `partial` or `settled` as the remaining
    /// balance dictates.
    pub async fn record_debt_payment(
        &self,
        debt_id: Uuid,
        amount: MoneyCents,
        recipient: Option<&str>,
        notes: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        let recipient = normalize_optional_text(recipient);
        let notes = normalize_optional_text(notes);
        with_tx!(self, |db_tx| {
            let (debt, totals) = self.load_debt_with_totals(&db_tx, debt_id).await?;
            validate_debt_payment(debt.kind, totals, amount)?;

            let payment = DebtPayment::new(debt_id, amount, paid_at, notes, recipient);
            let payment_id = payment.id;
            debt_payments::ActiveModel::from(&payment)
                .insert(&db_tx)
                .await?;

            let totals_after = debt_totals(debt.kind, debt.base_amount, totals.paid + amount);
            let status = if totals_after.remaining.is_zero() {
                DebtStatus::Settled
            } else {
                DebtStatus::Partial
            };
            if status != debt.status {
                let active = debts::ActiveModel {
                    id: ActiveValue::Set(debt_id),
                    status: ActiveValue::Set(status.as_str().to_string()),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }

            tracing::debug!(%debt_id, %payment_id, amount = %amount, status = status.as_str(), "recorded debt payment");
            Ok(payment_id)
        })
    }

    /// Settle a referral debt / mark a deposit debt paid back.
    ///
    /// Inserts one final payment equal to the current remaining balance
    /// (skipped when already zero) and flips the status to `settled`.
    pub async fn settle_debt(
        &self,
        debt_id: Uuid,
        recipient: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> ResultEngine<Option<Uuid>> {
        let recipient = normalize_optional_text(recipient);
        with_tx!(self, |db_tx| {
            let (debt, totals) = self.load_debt_with_totals(&db_tx, debt_id).await?;

            let payment_id = if totals.remaining.is_positive() {
                let payment = DebtPayment::new(
                    debt_id,
                    totals.remaining,
                    paid_at,
                    Some("Final settlement".to_string()),
                    recipient,
                );
                let id = payment.id;
                debt_payments::ActiveModel::from(&payment)
                    .insert(&db_tx)
                    .await?;
                Some(id)
            } else {
                None
            };

            if debt.status != DebtStatus::Settled {
                let active = debts::ActiveModel {
                    id: ActiveValue::Set(debt_id),
                    status: ActiveValue::Set(DebtStatus::Settled.as_str().to_string()),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }

            Ok(payment_id)
        })
    }

    /// One debt with its derived totals.
    pub async fn debt_view(&self, debt_id: Uuid) -> ResultEngine<(Debt, DebtTotals)> {
        with_tx!(self, |db_tx| {
            self.load_debt_with_totals(&db_tx, debt_id).await
        })
    }

    /// All debts (both kinds, unified) with derived totals.
    pub async fn list_debts(&self) -> ResultEngine<Vec<(Debt, DebtTotals)>> {
        with_tx!(self, |db_tx| {
            let models = debts::Entity::find()
                .order_by_asc(debts::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let debt = Debt::try_from(model)?;
                let paid = self.debt_paid_amount(&db_tx, debt.id).await?;
                let totals = debt_totals(debt.kind, debt.base_amount, paid);
                out.push((debt, totals));
            }
            Ok(out)
        })
    }

    pub async fn list_debt_payments(&self, debt_id: Uuid) -> ResultEngine<Vec<DebtPayment>> {
        let models = debt_payments::Entity::find()
            .filter(debt_payments::Column::DebtId.eq(debt_id))
            .order_by_asc(debt_payments::Column::PaidAt)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(DebtPayment::from).collect())
    }

    async fn load_debt_with_totals(
        &self,
        db_tx: &DatabaseTransaction,
        debt_id: Uuid,
    ) -> ResultEngine<(Debt, DebtTotals)> {
        let model = debts::Entity::find_by_id(debt_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("debt not exists".to_string()))?;
        let debt = Debt::try_from(model)?;
        let paid = self.debt_paid_amount(db_tx, debt_id).await?;
        let totals = debt_totals(debt.kind, debt.base_amount, paid);
        Ok((debt, totals))
    }

    async fn debt_paid_amount(
        &self,
        db_tx: &DatabaseTransaction,
        debt_id: Uuid,
    ) -> ResultEngine<MoneyCents> {
        let rows = debt_payments::Entity::find()
            .filter(debt_payments::Column::DebtId.eq(debt_id))
            .all(db_tx)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| MoneyCents::new(row.amount_cents))
            .sum())
    }
}
