use sea_orm::{DatabaseConnection, DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, clients, partners};

mod debts;
mod directory;
mod payouts;
mod reports;

pub use payouts::UnmarkOutcome;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Stateless facade over the database: loads rows, feeds the pure
/// computation layer, and performs the multi-step write sequences.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(super) async fn require_partner(
        &self,
        db_tx: &DatabaseTransaction,
        partner_id: Uuid,
    ) -> ResultEngine<crate::Partner> {
        let model = partners::Entity::find_by_id(partner_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("partner not exists".to_string()))?;
        crate::Partner::try_from(model)
    }

    pub(super) async fn require_client(
        &self,
        db_tx: &DatabaseTransaction,
        client_id: Uuid,
    ) -> ResultEngine<crate::Client> {
        let model = clients::Entity::find_by_id(client_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("client not exists".to_string()))?;
        Ok(crate::Client::from(model))
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
