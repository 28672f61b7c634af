//! Refdesk engine: referral-bonus balances, profit splits, and payment
//! reconciliation.
//!
//! The crate is split in two layers:
//!
//! - pure computation over fetched rows ([`report`], [`split`],
//!   [`reconcile`], [`debts::debt_totals`]) — no I/O, recomputed from
//!   scratch on every call;
//! - the [`Engine`] ops facade, which loads rows through sea-orm, feeds the
//!   pure layer, and runs every multi-step write inside a database
//!   transaction.

pub use app_payments::AppPayment;
pub use app_splits::PartnerAppSplit;
pub use assignments::Assignment;
pub use client_apps::{AppStatus, ClientApp};
pub use clients::Client;
pub use debt_payments::DebtPayment;
pub use debts::{
    BUSINESS_CREDITOR, Debt, DebtKind, DebtStatus, DebtTotals, debt_totals, validate_debt_payment,
};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, UnmarkOutcome};
pub use partners::Partner;
pub use payments::PartnerPayment;
pub use recipients::PaymentRecipient;
pub use report::{
    BalanceSummary, ClientBreakdown, MonthlyPoint, MonthlySeries, balance_summary,
    monthly_share_series, partner_breakdown,
};
pub use split::{ShareBps, Split, partner_defaults, resolve_split};

pub mod app_payments;
pub mod app_splits;
pub mod assignments;
pub mod client_apps;
pub mod clients;
pub mod debt_payments;
pub mod debts;
mod error;
mod money;
mod ops;
pub mod partners;
pub mod payments;
pub mod recipients;
pub mod reconcile;
pub mod report;
pub mod split;

pub type ResultEngine<T> = Result<T, EngineError>;
