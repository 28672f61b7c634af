//! Client-to-partner assignments.
//!
//! At most one assignment may exist per (client, partner) pair. Overrides are
//! optional per fraction; unassigning is a hard delete, not a status flag.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    partners::{share_from_column, share_to_column},
    split::ShareBps,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub partner_id: Uuid,
    pub partner_share: Option<ShareBps>,
    pub owner_share: Option<ShareBps>,
    pub notes: Option<String>,
}

impl Assignment {
    pub fn new(
        client_id: Uuid,
        partner_id: Uuid,
        partner_share: Option<ShareBps>,
        owner_share: Option<ShareBps>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            partner_id,
            partner_share,
            owner_share,
            notes,
        }
    }

    /// True when this assignment carries any split override.
    #[must_use]
    pub fn has_override(&self) -> bool {
        self.partner_share.is_some() || self.owner_share.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "client_partner_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub partner_id: Uuid,
    pub partner_share_bps: Option<i32>,
    pub owner_share_bps: Option<i32>,
    pub notes: Option<String>,
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
    #[sea_orm(
        belongs_to = "super::partners::Entity",
        from = "Column::PartnerId",
        to = "super::partners::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Partner,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::partners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Assignment> for ActiveModel {
    fn from(assignment: &Assignment) -> Self {
        Self {
            id: ActiveValue::Set(assignment.id),
            client_id: ActiveValue::Set(assignment.client_id),
            partner_id: ActiveValue::Set(assignment.partner_id),
            partner_share_bps: ActiveValue::Set(share_to_column(assignment.partner_share)),
            owner_share_bps: ActiveValue::Set(share_to_column(assignment.owner_share)),
            notes: ActiveValue::Set(assignment.notes.clone()),
        }
    }
}

impl TryFrom<Model> for Assignment {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            client_id: model.client_id,
            partner_id: model.partner_id,
            partner_share: share_from_column(model.partner_share_bps, "partner share")?,
            owner_share: share_from_column(model.owner_share_bps, "owner share")?,
            notes: model.notes,
        })
    }
}
