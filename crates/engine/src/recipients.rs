//! Payment-recipient suggestions.
//!
//! A small reference table backing the recipient picker on debt-payment
//! forms, fetched like any other entity rather than hardcoded in the
//! frontends.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecipient {
    pub id: Uuid,
    pub label: String,
}

impl PaymentRecipient {
    pub fn new(label: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_recipients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PaymentRecipient> for ActiveModel {
    fn from(recipient: &PaymentRecipient) -> Self {
        Self {
            id: ActiveValue::Set(recipient.id),
            label: ActiveValue::Set(recipient.label.clone()),
        }
    }
}

impl From<Model> for PaymentRecipient {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            label: model.label,
        }
    }
}
