//! Debts owed to or between the business and its counterparties.
//!
//! Two kinds share one table: referral debts (client owes client via a
//! referral link) and deposit debts (counterparty owes the business).
//! Remaining/surplus/total amounts are always derived, never stored:
//!
//! - `remaining = max(0, base - paid)`
//! - `surplus  = deposit ? max(0, paid - base) : 0`
//! - `total    = base + surplus`
//!
//! Referral debts reject payments beyond the remaining balance; deposit
//! debts accept unlimited overpayment and track it as surplus.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    Referral,
    Deposit,
}

impl DebtKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Referral => "referral",
            Self::Deposit => "deposit",
        }
    }
}

impl TryFrom<&str> for DebtKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "referral" => Ok(Self::Referral),
            "deposit" => Ok(Self::Deposit),
            other => Err(EngineError::InvalidName(format!(
                "invalid debt kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Open,
    Partial,
    Settled,
}

impl DebtStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Partial => "partial",
            Self::Settled => "settled",
        }
    }
}

impl TryFrom<&str> for DebtStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "partial" => Ok(Self::Partial),
            // Deposit debts historically used "paid_back".
            "settled" | "paid_back" => Ok(Self::Settled),
            other => Err(EngineError::InvalidName(format!(
                "invalid debt status: {other}"
            ))),
        }
    }
}

/// Label used as the creditor of every deposit debt.
pub const BUSINESS_CREDITOR: &str = "Business";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub kind: DebtKind,
    pub debtor: String,
    pub creditor: String,
    pub base_amount: MoneyCents,
    pub description: Option<String>,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
    pub assignee: Option<String>,
}

impl Debt {
    pub fn new(
        kind: DebtKind,
        debtor: String,
        creditor: String,
        base_amount: MoneyCents,
        description: Option<String>,
        assignee: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            debtor,
            // Deposit debts are always owed to the business.
            creditor: match kind {
                DebtKind::Deposit => BUSINESS_CREDITOR.to_string(),
                DebtKind::Referral => creditor,
            },
            base_amount,
            description,
            status: DebtStatus::Open,
            created_at,
            assignee,
        }
    }
}

/// Derived amounts for one debt, recomputed from its payment rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtTotals {
    pub paid: MoneyCents,
    pub remaining: MoneyCents,
    pub surplus: MoneyCents,
    pub total: MoneyCents,
}

/// Computes remaining/surplus/total for a debt of `kind` with `base` owed and
/// `paid` already applied.
#[must_use]
pub fn debt_totals(kind: DebtKind, base: MoneyCents, paid: MoneyCents) -> DebtTotals {
    let remaining = (base - paid).clamp_non_negative();
    let surplus = match kind {
        DebtKind::Deposit => (paid - base).clamp_non_negative(),
        DebtKind::Referral => MoneyCents::ZERO,
    };
    DebtTotals {
        paid,
        remaining,
        surplus,
        total: base + surplus,
    }
}

/// Validates a payment amount against the current totals.
///
/// Referral debts cap payments at the remaining balance; deposit debts accept
/// any positive amount (overpayment becomes surplus).
pub fn validate_debt_payment(
    kind: DebtKind,
    totals: DebtTotals,
    amount: MoneyCents,
) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "payment amount must be > 0".to_string(),
        ));
    }
    if kind == DebtKind::Referral && amount > totals.remaining {
        return Err(EngineError::PaymentExceedsRemaining(format!(
            "payment of {amount} exceeds remaining {}",
            totals.remaining
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    pub debtor: String,
    pub creditor: String,
    pub base_amount_cents: i64,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub assignee: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::debt_payments::Entity")]
    DebtPayments,
}

impl Related<super::debt_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DebtPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Debt> for ActiveModel {
    fn from(debt: &Debt) -> Self {
        Self {
            id: ActiveValue::Set(debt.id),
            kind: ActiveValue::Set(debt.kind.as_str().to_string()),
            debtor: ActiveValue::Set(debt.debtor.clone()),
            creditor: ActiveValue::Set(debt.creditor.clone()),
            base_amount_cents: ActiveValue::Set(debt.base_amount.cents()),
            description: ActiveValue::Set(debt.description.clone()),
            status: ActiveValue::Set(debt.status.as_str().to_string()),
            created_at: ActiveValue::Set(debt.created_at),
            assignee: ActiveValue::Set(debt.assignee.clone()),
        }
    }
}

impl TryFrom<Model> for Debt {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            kind: DebtKind::try_from(model.kind.as_str())?,
            debtor: model.debtor,
            creditor: model.creditor,
            base_amount: MoneyCents::new(model.base_amount_cents),
            description: model.description,
            status: DebtStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            assignee: model.assignee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const B: i64 = 100_00;

    fn totals(kind: DebtKind, paid: i64) -> DebtTotals {
        debt_totals(kind, MoneyCents::new(B), MoneyCents::new(paid))
    }

    #[test]
    fn deposit_surplus_monotonicity() {
        for paid in [0, 30_00, B, 130_00] {
            let t = totals(DebtKind::Deposit, paid);
            assert_eq!(t.remaining.cents(), (B - paid).max(0));
            assert_eq!(t.surplus.cents(), (paid - B).max(0));
            // remaining + min(paid, base) == base
            assert_eq!(t.remaining.cents() + paid.min(B), B);
            assert_eq!(t.total.cents(), B + t.surplus.cents());
        }
    }

    #[test]
    fn referral_has_no_surplus() {
        let t = totals(DebtKind::Referral, 130_00);
        assert_eq!(t.surplus, MoneyCents::ZERO);
        assert_eq!(t.total.cents(), B);
        assert_eq!(t.remaining, MoneyCents::ZERO);
    }

    #[test]
    fn referral_payment_capped_at_remaining() {
        let t = totals(DebtKind::Referral, 80_00);
        assert!(validate_debt_payment(DebtKind::Referral, t, MoneyCents::new(20_00)).is_ok());
        assert!(matches!(
            validate_debt_payment(DebtKind::Referral, t, MoneyCents::new(20_01)),
            Err(EngineError::PaymentExceedsRemaining(_))
        ));
    }

    #[test]
    fn deposit_accepts_overpayment() {
        let t = totals(DebtKind::Deposit, 80_00);
        assert!(validate_debt_payment(DebtKind::Deposit, t, MoneyCents::new(500_00)).is_ok());
        assert!(validate_debt_payment(DebtKind::Deposit, t, MoneyCents::ZERO).is_err());
    }

    #[test]
    fn deposit_creditor_is_always_the_business() {
        let debt = Debt::new(
            DebtKind::Deposit,
            "Acme".to_string(),
            "whoever".to_string(),
            MoneyCents::new(B),
            None,
            None,
            Utc::now(),
        );
        assert_eq!(debt.creditor, BUSINESS_CREDITOR);
        assert_eq!(debt.status, DebtStatus::Open);
    }
}
