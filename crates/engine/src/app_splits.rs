//! Per-app split overrides.
//!
//! A `PartnerAppSplit` pins the split for one (partner, app) pair and takes
//! precedence over assignment overrides and partner defaults.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    partners::share_from_column,
    split::{ShareBps, Split},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerAppSplit {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub client_app_id: Uuid,
    pub split: Split,
}

impl PartnerAppSplit {
    pub fn new(partner_id: Uuid, client_app_id: Uuid, split: Split) -> Self {
        Self {
            id: Uuid::new_v4(),
            partner_id,
            client_app_id,
            split,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "partner_app_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub partner_id: Uuid,
    pub client_app_id: Uuid,
    pub partner_share_bps: i32,
    pub owner_share_bps: i32,
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

impl ActiveModelBehavior for ActiveModel {}

impl From<&PartnerAppSplit> for ActiveModel {
    fn from(value: &PartnerAppSplit) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            partner_id: ActiveValue::Set(value.partner_id),
            client_app_id: ActiveValue::Set(value.client_app_id),
            partner_share_bps: ActiveValue::Set(i32::from(value.split.partner.get())),
            owner_share_bps: ActiveValue::Set(i32::from(value.split.owner.get())),
        }
    }
}

impl TryFrom<Model> for PartnerAppSplit {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let partner = share_from_column(Some(model.partner_share_bps), "partner share")?
            .unwrap_or(ShareBps::ZERO);
        let owner = share_from_column(Some(model.owner_share_bps), "owner share")?
            .unwrap_or(ShareBps::ZERO);
        Ok(Self {
            id: model.id,
            partner_id: model.partner_id,
            client_app_id: model.client_app_id,
            // Stored rows are not re-validated against the sum rule on read.
            split: Split { partner, owner },
        })
    }
}
