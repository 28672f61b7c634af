//! Pure view-model computation over fetched rows.
//!
//! Everything here is a function of in-memory arrays: no I/O, no caching.
//! Callers re-run these on every change to payments, assignments, splits, or
//! app rows, so the derived numbers are never stale beyond one fetch.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    MoneyCents,
    app_splits::PartnerAppSplit,
    assignments::Assignment,
    client_apps::{AppStatus, ClientApp},
    clients::Client,
    partners::Partner,
    payments::PartnerPayment,
    split::resolve_split,
};

/// One breakdown row: a client assigned to the partner, with profit and
/// shares over the client's completed (not yet paid) apps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientBreakdown {
    pub client_id: Uuid,
    pub client_name: String,
    pub total_profit: MoneyCents,
    pub partner_share: MoneyCents,
    pub owner_share: MoneyCents,
    /// True when an assignment-level or per-app override affects this row
    /// (used for badging in the UI).
    pub has_override: bool,
}

/// Scalar summary for a partner across all assigned clients.
///
/// `balance > 0`: the business still owes the partner. `balance < 0`: the
/// partner has been overpaid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub total_profit: MoneyCents,
    pub partner_share: MoneyCents,
    pub owner_share: MoneyCents,
    pub total_paid: MoneyCents,
    pub balance: MoneyCents,
}

/// Builds one breakdown row per assigned client.
///
/// Clients with zero completed apps still get a (zeroed) row; app rows whose
/// `client_id` is not in the assignment set are excluded entirely.
#[must_use]
pub fn partner_breakdown(
    partner: &Partner,
    assignments: &[Assignment],
    clients: &[Client],
    apps: &[ClientApp],
    app_splits: &[PartnerAppSplit],
) -> Vec<ClientBreakdown> {
    assignments
        .iter()
        .filter(|assignment| assignment.partner_id == partner.id)
        .map(|assignment| {
            let client_name = clients
                .iter()
                .find(|client| client.id == assignment.client_id)
                .map(|client| client.name.clone())
                .unwrap_or_default();

            let mut total_profit = MoneyCents::ZERO;
            let mut partner_share = MoneyCents::ZERO;
            let mut has_override = assignment.has_override();

            for app in apps
                .iter()
                .filter(|app| app.client_id == assignment.client_id)
                .filter(|app| app.status == AppStatus::Completed)
            {
                let app_split = app_splits
                    .iter()
                    .find(|split| {
                        split.partner_id == partner.id && split.client_app_id == app.id
                    })
                    .map(|split| split.split);
                has_override |= app_split.is_some();

                let split = resolve_split(partner, Some(assignment), app_split);
                total_profit += app.profit_us;
                partner_share += app.profit_us.share(split.partner);
            }

            ClientBreakdown {
                client_id: assignment.client_id,
                client_name,
                total_profit,
                partner_share,
                owner_share: total_profit - partner_share,
                has_override,
            }
        })
        .collect()
}

/// Reduces the breakdown plus the raw payment list into a single summary.
#[must_use]
pub fn balance_summary(
    breakdown: &[ClientBreakdown],
    payments: &[PartnerPayment],
) -> BalanceSummary {
    let total_profit: MoneyCents = breakdown.iter().map(|row| row.total_profit).sum();
    let partner_share: MoneyCents = breakdown.iter().map(|row| row.partner_share).sum();
    let total_paid: MoneyCents = payments.iter().map(|payment| payment.amount).sum();

    BalanceSummary {
        total_profit,
        partner_share,
        owner_share: total_profit - partner_share,
        total_paid,
        balance: partner_share - total_paid,
    }
}

/// One month of earned partner share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// Month label, `YYYY-MM`.
    pub month: String,
    pub amount: MoneyCents,
}

/// Ordered monthly buckets of the partner's earned share, rebuilt from
/// scratch on every call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonthlySeries {
    points: Vec<MonthlyPoint>,
}

impl MonthlySeries {
    /// Restartable iteration in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &MonthlyPoint> {
        self.points.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

impl IntoIterator for MonthlySeries {
    type Item = MonthlyPoint;
    type IntoIter = std::vec::IntoIter<MonthlyPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

/// Buckets the partner's share of each completed app by the calendar month
/// (UTC) of its completion timestamp. Rows without a timestamp are skipped.
#[must_use]
pub fn monthly_share_series(
    partner: &Partner,
    assignments: &[Assignment],
    apps: &[ClientApp],
    app_splits: &[PartnerAppSplit],
) -> MonthlySeries {
    let mut buckets: BTreeMap<(i32, u32), MoneyCents> = BTreeMap::new();

    for assignment in assignments
        .iter()
        .filter(|assignment| assignment.partner_id == partner.id)
    {
        for app in apps
            .iter()
            .filter(|app| app.client_id == assignment.client_id)
            .filter(|app| app.status == AppStatus::Completed)
        {
            let Some(completed_at) = app.completed_at else {
                continue;
            };
            let app_split = app_splits
                .iter()
                .find(|split| split.partner_id == partner.id && split.client_app_id == app.id)
                .map(|split| split.split);
            let split = resolve_split(partner, Some(assignment), app_split);

            *buckets
                .entry((completed_at.year(), completed_at.month()))
                .or_insert(MoneyCents::ZERO) += app.profit_us.share(split.partner);
        }
    }

    MonthlySeries {
        points: buckets
            .into_iter()
            .map(|((year, month), amount)| MonthlyPoint {
                month: format!("{year:04}-{month:02}"),
                amount,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::split::{ShareBps, Split};

    use super::*;

    fn partner_30_70() -> Partner {
        Partner::new(
            "Acme".to_string(),
            None,
            Some(ShareBps::new(3_000).unwrap()),
            Some(ShareBps::new(7_000).unwrap()),
            None,
        )
    }

    fn fixture(partner: &Partner) -> (Client, Assignment) {
        let client = Client::new("Alice".to_string(), None, None);
        let assignment = Assignment::new(client.id, partner.id, None, None, None);
        (client, assignment)
    }

    fn completed_app(client_id: Uuid, cents: i64, month: u32) -> ClientApp {
        ClientApp::new(
            client_id,
            "MegaApp".to_string(),
            MoneyCents::new(cents),
            Some(Utc.with_ymd_and_hms(2026, month, 15, 12, 0, 0).unwrap()),
        )
    }

    #[test]
    fn default_split_end_to_end() {
        let partner = partner_30_70();
        let (client, assignment) = fixture(&partner);
        let app = completed_app(client.id, 100_00, 3);

        let rows = partner_breakdown(
            &partner,
            std::slice::from_ref(&assignment),
            std::slice::from_ref(&client),
            std::slice::from_ref(&app),
            &[],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_profit.cents(), 100_00);
        assert_eq!(rows[0].partner_share.cents(), 30_00);
        assert_eq!(rows[0].owner_share.cents(), 70_00);
        assert!(!rows[0].has_override);

        let payment =
            PartnerPayment::new(partner.id, MoneyCents::new(30_00), None, Utc::now());
        let summary = balance_summary(&rows, std::slice::from_ref(&payment));
        assert_eq!(summary.balance, MoneyCents::ZERO);
        assert_eq!(summary.partner_share.cents(), 30_00);

        // Once the row flips to paid it leaves the denominator entirely.
        let mut paid = app;
        paid.status = AppStatus::Paid;
        let rows = partner_breakdown(
            &partner,
            std::slice::from_ref(&assignment),
            std::slice::from_ref(&client),
            std::slice::from_ref(&paid),
            &[],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_profit, MoneyCents::ZERO);
        assert_eq!(rows[0].partner_share, MoneyCents::ZERO);
    }

    #[test]
    fn balance_identity_holds() {
        let partner = partner_30_70();
        let (client_a, assignment_a) = fixture(&partner);
        let client_b = Client::new("Bob".to_string(), None, None);
        let assignment_b = Assignment::new(
            client_b.id,
            partner.id,
            Some(ShareBps::new(5_000).unwrap()),
            Some(ShareBps::new(5_000).unwrap()),
            None,
        );

        let apps = vec![
            completed_app(client_a.id, 40_00, 1),
            completed_app(client_b.id, 10_00, 2),
        ];
        let assignments = vec![assignment_a, assignment_b];
        let clients = vec![client_a, client_b];
        let payments = vec![
            PartnerPayment::new(partner.id, MoneyCents::new(5_00), None, Utc::now()),
            PartnerPayment::new(partner.id, MoneyCents::new(2_50), None, Utc::now()),
        ];

        let rows = partner_breakdown(&partner, &assignments, &clients, &apps, &[]);
        let summary = balance_summary(&rows, &payments);

        let share_sum: MoneyCents = rows.iter().map(|row| row.partner_share).sum();
        assert_eq!(summary.partner_share, share_sum);
        assert_eq!(summary.balance, summary.partner_share - summary.total_paid);
        assert_eq!(summary.partner_share.cents(), 12_00 + 5_00);
        assert!(rows[1].has_override);
    }

    #[test]
    fn app_split_wins_in_breakdown() {
        let partner = partner_30_70();
        let (client, assignment) = fixture(&partner);
        let app = completed_app(client.id, 100_00, 3);
        let pinned = PartnerAppSplit::new(
            partner.id,
            app.id,
            Split::validated(ShareBps::new(1_000).unwrap(), ShareBps::new(9_000).unwrap())
                .unwrap(),
        );

        let rows = partner_breakdown(
            &partner,
            std::slice::from_ref(&assignment),
            std::slice::from_ref(&client),
            std::slice::from_ref(&app),
            std::slice::from_ref(&pinned),
        );
        assert_eq!(rows[0].partner_share.cents(), 10_00);
        assert!(rows[0].has_override);
    }

    #[test]
    fn assigned_client_without_apps_still_appears() {
        let partner = partner_30_70();
        let (client, assignment) = fixture(&partner);
        let stray = completed_app(Uuid::new_v4(), 99_00, 4);

        let rows = partner_breakdown(
            &partner,
            std::slice::from_ref(&assignment),
            std::slice::from_ref(&client),
            std::slice::from_ref(&stray),
            &[],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_profit, MoneyCents::ZERO);
    }

    #[test]
    fn monthly_series_buckets_in_order() {
        let partner = partner_30_70();
        let (client, assignment) = fixture(&partner);
        let apps = vec![
            completed_app(client.id, 10_00, 3),
            completed_app(client.id, 20_00, 1),
            completed_app(client.id, 5_00, 1),
        ];

        let series = monthly_share_series(
            &partner,
            std::slice::from_ref(&assignment),
            &apps,
            &[],
        );
        let points: Vec<_> = series.iter().collect();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].month, "2026-01");
        assert_eq!(points[0].amount.cents(), 7_50);
        assert_eq!(points[1].month, "2026-03");
        assert_eq!(points[1].amount.cents(), 3_00);

        // Restartable: a second pass sees the same data.
        assert_eq!(series.iter().count(), 2);
    }
}
