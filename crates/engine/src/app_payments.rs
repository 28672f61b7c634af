//! Per-app payment audit rows (`partner_payments_by_client_app`).
//!
//! One row per app completion settled by a payout. `payment_id` links the
//! row to its aggregate [`PartnerPayment`](crate::PartnerPayment) and is the
//! authoritative reconciliation path; it is nullable because legacy rows
//! predate the column and are only discoverable through the note heuristics.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPayment {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub client_app_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub amount: MoneyCents,
    pub paid_at: DateTime<Utc>,
}

impl AppPayment {
    pub fn new(
        partner_id: Uuid,
        client_app_id: Uuid,
        payment_id: Option<Uuid>,
        amount: MoneyCents,
        paid_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            partner_id,
            client_app_id,
            payment_id,
            amount,
            paid_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "partner_payments_by_client_app")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub partner_id: Uuid,
    pub client_app_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub amount_cents: i64,
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
    #[sea_orm(
        belongs_to = "super::client_apps::Entity",
        from = "Column::ClientAppId",
        to = "super::client_apps::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ClientApp,
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Payment,
}

impl Related<super::partners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl Related<super::client_apps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientApp.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&AppPayment> for ActiveModel {
    fn from(row: &AppPayment) -> Self {
        Self {
            id: ActiveValue::Set(row.id),
            partner_id: ActiveValue::Set(row.partner_id),
            client_app_id: ActiveValue::Set(row.client_app_id),
            payment_id: ActiveValue::Set(row.payment_id),
            amount_cents: ActiveValue::Set(row.amount.cents()),
            paid_at: ActiveValue::Set(row.paid_at),
        }
    }
}

impl From<Model> for AppPayment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            partner_id: model.partner_id,
            client_app_id: model.client_app_id,
            payment_id: model.payment_id,
            amount: MoneyCents::new(model.amount_cents),
            paid_at: model.paid_at,
        }
    }
}
