//! Clients: the referred businesses whose completed apps generate profit.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

impl Client {
    pub fn new(name: String, contact: Option<String>, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            contact,
            notes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::assignments::Entity")]
    Assignments,
    #[sea_orm(has_many = "super::client_apps::Entity")]
    ClientApps,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::client_apps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientApps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Client> for ActiveModel {
    fn from(client: &Client) -> Self {
        Self {
            id: ActiveValue::Set(client.id),
            name: ActiveValue::Set(client.name.clone()),
            contact: ActiveValue::Set(client.contact.clone()),
            notes: ActiveValue::Set(client.notes.clone()),
        }
    }
}

impl From<Model> for Client {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact: model.contact,
            notes: model.notes,
        }
    }
}
