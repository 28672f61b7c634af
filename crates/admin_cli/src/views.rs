//! Conversions from engine types into the serializable view models.

use api_types::{debt, directory, payout, report};
use engine::{
    AppPayment, Assignment, BalanceSummary, Client, ClientApp, ClientBreakdown, Debt, DebtPayment,
    DebtTotals, MonthlyPoint, Partner, PartnerPayment, PaymentRecipient,
};

pub fn client(client: &Client) -> directory::ClientView {
    directory::ClientView {
        id: client.id,
        name: client.name.clone(),
        contact: client.contact.clone(),
        notes: client.notes.clone(),
    }
}

pub fn partner(partner: &Partner) -> directory::PartnerView {
    directory::PartnerView {
        id: partner.id,
        name: partner.name.clone(),
        contact: partner.contact.clone(),
        default_partner_share_bps: partner.default_partner_share.map(|share| share.get()),
        default_owner_share_bps: partner.default_owner_share.map(|share| share.get()),
        notes: partner.notes.clone(),
    }
}

pub fn assignment(assignment: &Assignment) -> directory::AssignmentView {
    directory::AssignmentView {
        id: assignment.id,
        client_id: assignment.client_id,
        partner_id: assignment.partner_id,
        partner_share_bps: assignment.partner_share.map(|share| share.get()),
        owner_share_bps: assignment.owner_share.map(|share| share.get()),
        notes: assignment.notes.clone(),
    }
}

pub fn client_app(app: &ClientApp) -> directory::ClientAppView {
    directory::ClientAppView {
        id: app.id,
        client_id: app.client_id,
        app_name: app.app_name.clone(),
        profit_us_cents: app.profit_us.cents(),
        status: app.status.as_str().to_string(),
        completed_at: app.completed_at,
    }
}

pub fn payment(payment: &PartnerPayment) -> payout::PaymentView {
    payout::PaymentView {
        id: payment.id,
        partner_id: payment.partner_id,
        amount_cents: payment.amount.cents(),
        note: payment.note.clone(),
        paid_at: payment.paid_at,
    }
}

pub fn app_payment(audit: &AppPayment) -> payout::AppPaymentView {
    payout::AppPaymentView {
        id: audit.id,
        client_app_id: audit.client_app_id,
        payment_id: audit.payment_id,
        amount_cents: audit.amount.cents(),
        paid_at: audit.paid_at,
    }
}

pub fn recipient(recipient: &PaymentRecipient) -> payout::RecipientView {
    payout::RecipientView {
        id: recipient.id,
        label: recipient.label.clone(),
    }
}

pub fn breakdown_row(row: &ClientBreakdown) -> report::BreakdownRow {
    report::BreakdownRow {
        client_id: row.client_id,
        client_name: row.client_name.clone(),
        total_profit_cents: row.total_profit.cents(),
        partner_share_cents: row.partner_share.cents(),
        owner_share_cents: row.owner_share.cents(),
        has_override: row.has_override,
    }
}

pub fn balance(summary: &BalanceSummary) -> report::BalanceView {
    report::BalanceView {
        total_profit_cents: summary.total_profit.cents(),
        partner_share_cents: summary.partner_share.cents(),
        owner_share_cents: summary.owner_share.cents(),
        total_paid_cents: summary.total_paid.cents(),
        balance_cents: summary.balance.cents(),
    }
}

pub fn monthly_point(point: &MonthlyPoint) -> report::MonthlyPointView {
    report::MonthlyPointView {
        month: point.month.clone(),
        amount_cents: point.amount.cents(),
    }
}

pub fn debt(debt: &Debt, totals: &DebtTotals) -> debt::DebtView {
    debt::DebtView {
        id: debt.id,
        kind: debt.kind.as_str().to_string(),
        debtor: debt.debtor.clone(),
        creditor: debt.creditor.clone(),
        base_amount_cents: debt.base_amount.cents(),
        description: debt.description.clone(),
        status: debt.status.as_str().to_string(),
        assignee: debt.assignee.clone(),
        created_at: debt.created_at,
        paid_cents: totals.paid.cents(),
        remaining_cents: totals.remaining.cents(),
        surplus_cents: totals.surplus.cents(),
        total_cents: totals.total.cents(),
    }
}

pub fn debt_payment(payment: &DebtPayment) -> debt::DebtPaymentView {
    debt::DebtPaymentView {
        id: payment.id,
        debt_id: payment.debt_id,
        amount_cents: payment.amount.cents(),
        paid_at: payment.paid_at,
        notes: payment.notes.clone(),
        recipient: payment.recipient.clone(),
    }
}
