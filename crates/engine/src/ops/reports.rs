//! Report queries: load fresh rows and run the pure computation layer.
//!
//! Nothing here caches; every call re-derives from the current database
//! state, mirroring the recompute-on-every-render model of the dashboard.

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Assignment, BalanceSummary, Client, ClientApp, ClientBreakdown, MonthlySeries, Partner,
    PartnerAppSplit, PartnerPayment, ResultEngine, app_splits, assignments, client_apps, clients,
    payments, report,
};

use super::{Engine, with_tx};

/// Everything needed to compute a partner's views, loaded in one snapshot.
struct PartnerSnapshot {
    partner: Partner,
    assignments: Vec<Assignment>,
    clients: Vec<Client>,
    apps: Vec<ClientApp>,
    app_splits: Vec<PartnerAppSplit>,
    payments: Vec<PartnerPayment>,
}

impl Engine {
    /// Per-client profit breakdown for a partner.
    pub async fn partner_breakdown(&self, partner_id: Uuid) -> ResultEngine<Vec<ClientBreakdown>> {
        let snapshot = self.load_partner_snapshot(partner_id).await?;
        Ok(report::partner_breakdown(
            &snapshot.partner,
            &snapshot.assignments,
            &snapshot.clients,
            &snapshot.apps,
            &snapshot.app_splits,
        ))
    }

    /// Scalar balance summary for a partner.
    pub async fn partner_balance(&self, partner_id: Uuid) -> ResultEngine<BalanceSummary> {
        let snapshot = self.load_partner_snapshot(partner_id).await?;
        let breakdown = report::partner_breakdown(
            &snapshot.partner,
            &snapshot.assignments,
            &snapshot.clients,
            &snapshot.apps,
            &snapshot.app_splits,
        );
        Ok(report::balance_summary(&breakdown, &snapshot.payments))
    }

    /// Monthly earned-share series for a partner (bar-chart data).
    pub async fn partner_monthly_series(&self, partner_id: Uuid) -> ResultEngine<MonthlySeries> {
        let snapshot = self.load_partner_snapshot(partner_id).await?;
        Ok(report::monthly_share_series(
            &snapshot.partner,
            &snapshot.assignments,
            &snapshot.apps,
            &snapshot.app_splits,
        ))
    }

    async fn load_partner_snapshot(&self, partner_id: Uuid) -> ResultEngine<PartnerSnapshot> {
        with_tx!(self, |db_tx| {
            let partner = self.require_partner(&db_tx, partner_id).await?;

            let assignments = assignments::Entity::find()
                .filter(assignments::Column::PartnerId.eq(partner_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Assignment::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let client_ids: Vec<Uuid> = assignments
                .iter()
                .map(|assignment| assignment.client_id)
                .collect();

            let clients = clients::Entity::find()
                .filter(clients::Column::Id.is_in(client_ids.clone()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Client::from)
                .collect();

            let apps = client_apps::Entity::find()
                .filter(client_apps::Column::ClientId.is_in(client_ids))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ClientApp::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let app_splits = app_splits::Entity::find()
                .filter(app_splits::Column::PartnerId.eq(partner_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(PartnerAppSplit::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let payments = payments::Entity::find()
                .filter(payments::Column::PartnerId.eq(partner_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(PartnerPayment::from)
                .collect();

            Ok(PartnerSnapshot {
                partner,
                assignments,
                clients,
                apps,
                app_splits,
                payments,
            })
        })
    }
}
