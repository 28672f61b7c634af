//! Completed client apps: the units of work that generate partner-shareable
//! profit.
//!
//! Only rows with status `completed` feed the "still owed" totals; a row
//! flipped to `paid` by a payout no longer contributes.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Pending,
    Completed,
    Paid,
}

impl AppStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for AppStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::InvalidName(format!(
                "invalid app status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientApp {
    pub id: Uuid,
    pub client_id: Uuid,
    pub app_name: String,
    pub profit_us: MoneyCents,
    pub status: AppStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ClientApp {
    pub fn new(
        client_id: Uuid,
        app_name: String,
        profit_us: MoneyCents,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            app_name,
            profit_us,
            status: AppStatus::Completed,
            completed_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "client_apps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub app_name: String,
    pub profit_us_cents: i64,
    pub status: String,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(has_many = "super::app_payments::Entity")]
    AppPayments,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::app_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AppPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ClientApp> for ActiveModel {
    fn from(app: &ClientApp) -> Self {
        Self {
            id: ActiveValue::Set(app.id),
            client_id: ActiveValue::Set(app.client_id),
            app_name: ActiveValue::Set(app.app_name.clone()),
            profit_us_cents: ActiveValue::Set(app.profit_us.cents()),
            status: ActiveValue::Set(app.status.as_str().to_string()),
            completed_at: ActiveValue::Set(app.completed_at),
        }
    }
}

impl TryFrom<Model> for ClientApp {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            client_id: model.client_id,
            app_name: model.app_name,
            profit_us: MoneyCents::new(model.profit_us_cents),
            status: AppStatus::try_from(model.status.as_str())?,
            completed_at: model.completed_at,
        })
    }
}
