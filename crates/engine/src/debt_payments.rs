//! Payments applied against a debt.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPayment {
    pub id: Uuid,
    pub debt_id: Uuid,
    pub amount: MoneyCents,
    pub paid_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub recipient: Option<String>,
}

impl DebtPayment {
    pub fn new(
        debt_id: Uuid,
        amount: MoneyCents,
        paid_at: DateTime<Utc>,
        notes: Option<String>,
        recipient: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            debt_id,
            amount,
            paid_at,
            notes,
            recipient,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debt_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub debt_id: Uuid,
    pub amount_cents: i64,
    pub paid_at: DateTimeUtc,
    pub notes: Option<String>,
    pub recipient: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::debts::Entity",
        from = "Column::DebtId",
        to = "super::debts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Debt,
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DebtPayment> for ActiveModel {
    fn from(payment: &DebtPayment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id),
            debt_id: ActiveValue::Set(payment.debt_id),
            amount_cents: ActiveValue::Set(payment.amount.cents()),
            paid_at: ActiveValue::Set(payment.paid_at),
            notes: ActiveValue::Set(payment.notes.clone()),
            recipient: ActiveValue::Set(payment.recipient.clone()),
        }
    }
}

impl From<Model> for DebtPayment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            debt_id: model.debt_id,
            amount: MoneyCents::new(model.amount_cents),
            paid_at: model.paid_at,
            notes: model.notes,
            recipient: model.recipient,
        }
    }
}
