//! CRUD for the directory entities: clients, partners, assignments, per-app
//! splits, client-app rows, and payment-recipient suggestions.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Assignment, Client, ClientApp, EngineError, MoneyCents, Partner, PartnerAppSplit,
    PaymentRecipient, ResultEngine, Split, app_splits, assignments, client_apps, clients,
    partners, recipients,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Register a new client.
    pub async fn new_client(
        &self,
        name: &str,
        contact: Option<&str>,
        notes: Option<&str>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "client")?;
        let client = Client::new(
            name,
            normalize_optional_text(contact),
            normalize_optional_text(notes),
        );
        let id = client.id;
        with_tx!(self, |db_tx| {
            clients::ActiveModel::from(&client).insert(&db_tx).await?;
            Ok::<(), EngineError>(())
        })?;
        tracing::debug!(client_id = %id, "created client");
        Ok(id)
    }

    /// Register a new partner. Default shares, when both given, must sum to
    /// 100%.
    pub async fn new_partner(
        &self,
        name: &str,
        contact: Option<&str>,
        default_split: Option<Split>,
        notes: Option<&str>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "partner")?;
        let partner = Partner::new(
            name,
            normalize_optional_text(contact),
            default_split.map(|split| split.partner),
            default_split.map(|split| split.owner),
            normalize_optional_text(notes),
        );
        let id = partner.id;
        with_tx!(self, |db_tx| {
            partners::ActiveModel::from(&partner).insert(&db_tx).await?;
            Ok::<(), EngineError>(())
        })?;
        tracing::debug!(partner_id = %id, "created partner");
        Ok(id)
    }

    /// Replace a client's name, contact, and notes.
    pub async fn update_client(
        &self,
        client_id: Uuid,
        name: &str,
        contact: Option<&str>,
        notes: Option<&str>,
    ) -> ResultEngine<()> {
        let name = normalize_required_name(name, "client")?;
        let contact = normalize_optional_text(contact);
        let notes = normalize_optional_text(notes);
        with_tx!(self, |db_tx| {
            self.require_client(&db_tx, client_id).await?;
            let active = clients::ActiveModel {
                id: ActiveValue::Set(client_id),
                name: ActiveValue::Set(name),
                contact: ActiveValue::Set(contact),
                notes: ActiveValue::Set(notes),
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Replace a partner's name, contact, and notes. Default shares are
    /// managed separately via [`Engine::set_partner_defaults`].
    pub async fn update_partner(
        &self,
        partner_id: Uuid,
        name: &str,
        contact: Option<&str>,
        notes: Option<&str>,
    ) -> ResultEngine<()> {
        let name = normalize_required_name(name, "partner")?;
        let contact = normalize_optional_text(contact);
        let notes = normalize_optional_text(notes);
        with_tx!(self, |db_tx| {
            self.require_partner(&db_tx, partner_id).await?;
            let active = partners::ActiveModel {
                id: ActiveValue::Set(partner_id),
                name: ActiveValue::Set(name),
                contact: ActiveValue::Set(contact),
                notes: ActiveValue::Set(notes),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Update a partner's default split (validated to sum to 100%).
    pub async fn set_partner_defaults(
        &self,
        partner_id: Uuid,
        default_split: Split,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_partner(&db_tx, partner_id).await?;
            let active = partners::ActiveModel {
                id: ActiveValue::Set(partner_id),
                default_partner_share_bps: ActiveValue::Set(Some(i32::from(
                    default_split.partner.get(),
                ))),
                default_owner_share_bps: ActiveValue::Set(Some(i32::from(
                    default_split.owner.get(),
                ))),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn list_clients(&self) -> ResultEngine<Vec<Client>> {
        let models = clients::Entity::find()
            .order_by_asc(clients::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Client::from).collect())
    }

    pub async fn list_partners(&self) -> ResultEngine<Vec<Partner>> {
        let models = partners::Entity::find()
            .order_by_asc(partners::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Partner::try_from).collect()
    }

    /// Assign a client to a partner, optionally overriding the split.
    ///
    /// At most one assignment may exist per (client, partner) pair.
    pub async fn assign_client(
        &self,
        client_id: Uuid,
        partner_id: Uuid,
        override_split: Option<Split>,
        notes: Option<&str>,
    ) -> ResultEngine<Uuid> {
        let notes = normalize_optional_text(notes);
        with_tx!(self, |db_tx| {
            let client = self.require_client(&db_tx, client_id).await?;
            self.require_partner(&db_tx, partner_id).await?;

            let existing = assignments::Entity::find()
                .filter(assignments::Column::ClientId.eq(client_id))
                .filter(assignments::Column::PartnerId.eq(partner_id))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(client.name));
            }

            let assignment = Assignment::new(
                client_id,
                partner_id,
                override_split.map(|split| split.partner),
                override_split.map(|split| split.owner),
                notes,
            );
            let id = assignment.id;
            assignments::ActiveModel::from(&assignment)
                .insert(&db_tx)
                .await?;
            Ok(id)
        })
    }

    /// Remove an assignment. This is a hard delete, not a status flag.
    pub async fn unassign_client(&self, client_id: Uuid, partner_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = assignments::Entity::find()
                .filter(assignments::Column::ClientId.eq(client_id))
                .filter(assignments::Column::PartnerId.eq(partner_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("assignment not exists".to_string()))?;
            assignments::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn list_assignments(&self, partner_id: Uuid) -> ResultEngine<Vec<Assignment>> {
        let models = assignments::Entity::find()
            .filter(assignments::Column::PartnerId.eq(partner_id))
            .all(&self.database)
            .await?;
        models.into_iter().map(Assignment::try_from).collect()
    }

    /// Pin the split for one (partner, app) pair, overwriting any previous
    /// pin.
    pub async fn set_app_split(
        &self,
        partner_id: Uuid,
        client_app_id: Uuid,
        split: Split,
    ) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.require_partner(&db_tx, partner_id).await?;
            client_apps::Entity::find_by_id(client_app_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("client app not exists".to_string()))?;

            let existing = app_splits::Entity::find()
                .filter(app_splits::Column::PartnerId.eq(partner_id))
                .filter(app_splits::Column::ClientAppId.eq(client_app_id))
                .one(&db_tx)
                .await?;
            match existing {
                Some(existing) => {
                    let active = app_splits::ActiveModel {
                        id: ActiveValue::Set(existing.id),
                        partner_share_bps: ActiveValue::Set(i32::from(split.partner.get())),
                        owner_share_bps: ActiveValue::Set(i32::from(split.owner.get())),
                        ..Default::default()
                    };
                    active.update(&db_tx).await?;
                    Ok(existing.id)
                }
                None => {
                    let pin = PartnerAppSplit::new(partner_id, client_app_id, split);
                    let id = pin.id;
                    app_splits::ActiveModel::from(&pin).insert(&db_tx).await?;
                    Ok(id)
                }
            }
        })
    }

    /// Drop a per-app split pin; the app falls back to assignment-level, then
    /// partner-level defaults.
    pub async fn delete_app_split(
        &self,
        partner_id: Uuid,
        client_app_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = app_splits::Entity::find()
                .filter(app_splits::Column::PartnerId.eq(partner_id))
                .filter(app_splits::Column::ClientAppId.eq(client_app_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("app split not exists".to_string()))?;
            app_splits::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Record a completed client-app row with its profit.
    pub async fn new_client_app(
        &self,
        client_id: Uuid,
        app_name: &str,
        profit_us: MoneyCents,
        completed_at: Option<DateTime<Utc>>,
    ) -> ResultEngine<Uuid> {
        let app_name = normalize_required_name(app_name, "app")?;
        if profit_us.is_negative() {
            return Err(EngineError::InvalidAmount(
                "profit must not be negative".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_client(&db_tx, client_id).await?;
            let app = ClientApp::new(client_id, app_name, profit_us, completed_at);
            let id = app.id;
            client_apps::ActiveModel::from(&app).insert(&db_tx).await?;
            Ok(id)
        })
    }

    pub async fn list_client_apps(&self, client_id: Uuid) -> ResultEngine<Vec<ClientApp>> {
        let models = client_apps::Entity::find()
            .filter(client_apps::Column::ClientId.eq(client_id))
            .order_by_asc(client_apps::Column::CompletedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(ClientApp::try_from).collect()
    }

    /// Add a payment-recipient suggestion (idempotent on label).
    pub async fn add_payment_recipient(&self, label: &str) -> ResultEngine<Uuid> {
        let label = normalize_required_name(label, "recipient")?;
        with_tx!(self, |db_tx| {
            let existing = recipients::Entity::find()
                .filter(recipients::Column::Label.eq(label.clone()))
                .one(&db_tx)
                .await?;
            match existing {
                Some(existing) => Ok(existing.id),
                None => {
                    let recipient = PaymentRecipient::new(label);
                    let id = recipient.id;
                    recipients::ActiveModel::from(&recipient)
                        .insert(&db_tx)
                        .await?;
                    Ok(id)
                }
            }
        })
    }

    pub async fn list_payment_recipients(&self) -> ResultEngine<Vec<PaymentRecipient>> {
        let models = recipients::Entity::find()
            .order_by_asc(recipients::Column::Label)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(PaymentRecipient::from).collect())
    }
}
