//! Serializable view models shared by the tools that render engine output.
//!
//! Amounts are integer cents (`*_cents`), shares are basis points
//! (`*_share_bps`, 10_000 = 100%). Formatting into currency or percent
//! strings is left to the presentation side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod directory {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientView {
        pub id: Uuid,
        pub name: String,
        pub contact: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PartnerView {
        pub id: Uuid,
        pub name: String,
        pub contact: Option<String>,
        pub default_partner_share_bps: Option<u16>,
        pub default_owner_share_bps: Option<u16>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentView {
        pub id: Uuid,
        pub client_id: Uuid,
        pub partner_id: Uuid,
        pub partner_share_bps: Option<u16>,
        pub owner_share_bps: Option<u16>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientAppView {
        pub id: Uuid,
        pub client_id: Uuid,
        pub app_name: String,
        pub profit_us_cents: i64,
        pub status: String,
        pub completed_at: Option<DateTime<Utc>>,
    }
}

pub mod payout {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub partner_id: Uuid,
        pub amount_cents: i64,
        pub note: Option<String>,
        pub paid_at: DateTime<Utc>,
    }

    /// One per-app audit row behind an aggregate payment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppPaymentView {
        pub id: Uuid,
        pub client_app_id: Uuid,
        pub payment_id: Option<Uuid>,
        pub amount_cents: i64,
        pub paid_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipientView {
        pub id: Uuid,
        pub label: String,
    }
}

pub mod report {
    use super::*;

    /// Per-client row of a partner's profit breakdown.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BreakdownRow {
        pub client_id: Uuid,
        pub client_name: String,
        pub total_profit_cents: i64,
        pub partner_share_cents: i64,
        pub owner_share_cents: i64,
        /// Whether any split other than the partner default applied.
        pub has_override: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub total_profit_cents: i64,
        pub partner_share_cents: i64,
        pub owner_share_cents: i64,
        pub total_paid_cents: i64,
        /// Still owed to the partner; negative means overpaid.
        pub balance_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyPointView {
        /// `YYYY-MM`, UTC.
        pub month: String,
        pub amount_cents: i64,
    }
}

pub mod debt {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtView {
        pub id: Uuid,
        pub kind: String,
        pub debtor: String,
        pub creditor: String,
        pub base_amount_cents: i64,
        pub description: Option<String>,
        pub status: String,
        pub assignee: Option<String>,
        pub created_at: DateTime<Utc>,
        pub paid_cents: i64,
        pub remaining_cents: i64,
        pub surplus_cents: i64,
        pub total_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtPaymentView {
        pub id: Uuid,
        pub debt_id: Uuid,
        pub amount_cents: i64,
        pub paid_at: DateTime<Utc>,
        pub notes: Option<String>,
        pub recipient: Option<String>,
    }
}
