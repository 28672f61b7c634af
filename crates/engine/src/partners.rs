//! Partners: profit-sharing counterparties.
//!
//! A partner's default shares are optional; the resolver falls back to
//! 25%/75% when they are missing. Partners are never hard-deleted.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, split::ShareBps};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub default_partner_share: Option<ShareBps>,
    pub default_owner_share: Option<ShareBps>,
    pub notes: Option<String>,
}

impl Partner {
    pub fn new(
        name: String,
        contact: Option<String>,
        default_partner_share: Option<ShareBps>,
        default_owner_share: Option<ShareBps>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            contact,
            default_partner_share,
            default_owner_share,
            notes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub default_partner_share_bps: Option<i32>,
    pub default_owner_share_bps: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::assignments::Entity")]
    Assignments,
    #[sea_orm(has_many = "super::app_splits::Entity")]
    AppSplits,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::app_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AppSplits.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn share_from_column(value: Option<i32>, label: &str) -> ResultEngine<Option<ShareBps>> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let bps = u16::try_from(raw)
                .map_err(|_| EngineError::InvalidShare(format!("stored {label} out of range")))?;
            ShareBps::new(bps).map(Some)
        }
    }
}

pub(crate) fn share_to_column(value: Option<ShareBps>) -> Option<i32> {
    value.map(|bps| i32::from(bps.get()))
}

impl From<&Partner> for ActiveModel {
    fn from(partner: &Partner) -> Self {
        Self {
            id: ActiveValue::Set(partner.id),
            name: ActiveValue::Set(partner.name.clone()),
            contact: ActiveValue::Set(partner.contact.clone()),
            default_partner_share_bps: ActiveValue::Set(share_to_column(
                partner.default_partner_share,
            )),
            default_owner_share_bps: ActiveValue::Set(share_to_column(
                partner.default_owner_share,
            )),
            notes: ActiveValue::Set(partner.notes.clone()),
        }
    }
}

impl TryFrom<Model> for Partner {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            contact: model.contact,
            default_partner_share: share_from_column(
                model.default_partner_share_bps,
                "partner share",
            )?,
            default_owner_share: share_from_column(model.default_owner_share_bps, "owner share")?,
            notes: model.notes,
        })
    }
}
