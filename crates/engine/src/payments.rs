//! Aggregate partner payments.
//!
//! One row per payout from the business to a partner. Payout-generated rows
//! carry the note convention `Payment for <names> [<id1>,<id2>,...]`; the
//! bracketed ids are kept for human readability and for reconciling legacy
//! rows that predate the explicit join on `partner_payments_by_client_app`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerPayment {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub amount: MoneyCents,
    pub note: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl PartnerPayment {
    pub fn new(
        partner_id: Uuid,
        amount: MoneyCents,
        note: Option<String>,
        paid_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            partner_id,
            amount,
            note,
            paid_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "partner_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub partner_id: Uuid,
    pub amount_cents: i64,
    pub note: Option<String>,
    pub paid_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::partners::Entity",
        from = "Column::PartnerId",
        to = "super::partners::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Partner,
    #[sea_orm(has_many = "super::app_payments::Entity")]
    AppPayments,
}

impl Related<super::partners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl Related<super::app_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AppPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PartnerPayment> for ActiveModel {
    fn from(payment: &PartnerPayment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id),
            partner_id: ActiveValue::Set(payment.partner_id),
            amount_cents: ActiveValue::Set(payment.amount.cents()),
            note: ActiveValue::Set(payment.note.clone()),
            paid_at: ActiveValue::Set(payment.paid_at),
        }
    }
}

impl From<Model> for PartnerPayment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            partner_id: model.partner_id,
            amount: MoneyCents::new(model.amount_cents),
            note: model.note,
            paid_at: model.paid_at,
        }
    }
}
