//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for Refdesk:
//!
//! - `clients`: referred clients
//! - `partners`: referral partners with optional default split
//! - `client_partner_assignments`: which partner referred which client
//! - `client_apps`: delivered apps with the profit they brought in
//! - `partner_app_splits`: per-app split pins overriding the defaults
//! - `partner_payments`: aggregate payouts made to a partner
//! - `partner_payments_by_client_app`: per-app audit rows behind each payout
//! - `debts` / `debt_payments`: referral debts and security deposits
//! - `payment_recipients`: suggestion list for payment recipient fields

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Clients {
    Table,
    Id,
    Name,
    Contact,
    Notes,
}

#[derive(Iden)]
enum Partners {
    Table,
    Id,
    Name,
    Contact,
    DefaultPartnerShareBps,
    DefaultOwnerShareBps,
    Notes,
}

#[derive(Iden)]
enum ClientPartnerAssignments {
    Table,
    Id,
    ClientId,
    PartnerId,
    PartnerShareBps,
    OwnerShareBps,
    Notes,
}

#[derive(Iden)]
enum ClientApps {
    Table,
    Id,
    ClientId,
    AppName,
    ProfitUsCents,
    Status,
    CompletedAt,
}

#[derive(Iden)]
enum PartnerAppSplits {
    Table,
    Id,
    PartnerId,
    ClientAppId,
    PartnerShareBps,
    OwnerShareBps,
}

#[derive(Iden)]
enum PartnerPayments {
    Table,
    Id,
    PartnerId,
    AmountCents,
    Note,
    PaidAt,
}

#[derive(Iden)]
enum PartnerPaymentsByClientApp {
    Table,
    Id,
    PartnerId,
    ClientAppId,
    PaymentId,
    AmountCents,
    PaidAt,
}

#[derive(Iden)]
enum Debts {
    Table,
    Id,
    Kind,
    Debtor,
    Creditor,
    BaseAmountCents,
    Description,
    Status,
    Assignee,
    CreatedAt,
}

#[derive(Iden)]
enum DebtPayments {
    Table,
    Id,
    DebtId,
    AmountCents,
    PaidAt,
    Notes,
    Recipient,
}

#[derive(Iden)]
enum PaymentRecipients {
    Table,
    Id,
    Label,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Clients
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Clients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Clients::Name).string().not_null())
                    .col(ColumnDef::new(Clients::Contact).string())
                    .col(ColumnDef::new(Clients::Notes).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Partners
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Partners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Partners::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Partners::Name).string().not_null())
                    .col(ColumnDef::new(Partners::Contact).string())
                    .col(ColumnDef::new(Partners::DefaultPartnerShareBps).integer())
                    .col(ColumnDef::new(Partners::DefaultOwnerShareBps).integer())
                    .col(ColumnDef::new(Partners::Notes).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Client apps
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ClientApps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientApps::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientApps::ClientId).uuid().not_null())
                    .col(ColumnDef::new(ClientApps::AppName).string().not_null())
                    .col(
                        ColumnDef::new(ClientApps::ProfitUsCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClientApps::Status).string().not_null())
                    .col(ColumnDef::new(ClientApps::CompletedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-client_apps-client_id")
                            .from(ClientApps::Table, ClientApps::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-client_apps-client_id")
                    .table(ClientApps::Table)
                    .col(ClientApps::ClientId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Client-partner assignments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ClientPartnerAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientPartnerAssignments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClientPartnerAssignments::ClientId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientPartnerAssignments::PartnerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClientPartnerAssignments::PartnerShareBps).integer())
                    .col(ColumnDef::new(ClientPartnerAssignments::OwnerShareBps).integer())
                    .col(ColumnDef::new(ClientPartnerAssignments::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-client_partner_assignments-client_id")
                            .from(
                                ClientPartnerAssignments::Table,
                                ClientPartnerAssignments::ClientId,
                            )
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-client_partner_assignments-partner_id")
                            .from(
                                ClientPartnerAssignments::Table,
                                ClientPartnerAssignments::PartnerId,
                            )
                            .to(Partners::Table, Partners::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-client_partner_assignments-pair-unique")
                    .table(ClientPartnerAssignments::Table)
                    .col(ClientPartnerAssignments::ClientId)
                    .col(ClientPartnerAssignments::PartnerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Partner app splits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PartnerAppSplits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PartnerAppSplits::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PartnerAppSplits::PartnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(PartnerAppSplits::ClientAppId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PartnerAppSplits::PartnerShareBps)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PartnerAppSplits::OwnerShareBps)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-partner_app_splits-partner_id")
                            .from(PartnerAppSplits::Table, PartnerAppSplits::PartnerId)
                            .to(Partners::Table, Partners::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-partner_app_splits-client_app_id")
                            .from(PartnerAppSplits::Table, PartnerAppSplits::ClientAppId)
                            .to(ClientApps::Table, ClientApps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-partner_app_splits-pair-unique")
                    .table(PartnerAppSplits::Table)
                    .col(PartnerAppSplits::PartnerId)
                    .col(PartnerAppSplits::ClientAppId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Partner payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PartnerPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PartnerPayments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PartnerPayments::PartnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(PartnerPayments::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PartnerPayments::Note).string())
                    .col(
                        ColumnDef::new(PartnerPayments::PaidAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-partner_payments-partner_id")
                            .from(PartnerPayments::Table, PartnerPayments::PartnerId)
                            .to(Partners::Table, Partners::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-partner_payments-partner_id-paid_at")
                    .table(PartnerPayments::Table)
                    .col(PartnerPayments::PartnerId)
                    .col(PartnerPayments::PaidAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Partner payments by client app
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PartnerPaymentsByClientApp::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PartnerPaymentsByClientApp::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PartnerPaymentsByClientApp::PartnerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PartnerPaymentsByClientApp::ClientAppId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PartnerPaymentsByClientApp::PaymentId).uuid())
                    .col(
                        ColumnDef::new(PartnerPaymentsByClientApp::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PartnerPaymentsByClientApp::PaidAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-partner_payments_by_client_app-partner_id")
                            .from(
                                PartnerPaymentsByClientApp::Table,
                                PartnerPaymentsByClientApp::PartnerId,
                            )
                            .to(Partners::Table, Partners::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-partner_payments_by_client_app-client_app_id")
                            .from(
                                PartnerPaymentsByClientApp::Table,
                                PartnerPaymentsByClientApp::ClientAppId,
                            )
                            .to(ClientApps::Table, ClientApps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-partner_payments_by_client_app-payment_id")
                            .from(
                                PartnerPaymentsByClientApp::Table,
                                PartnerPaymentsByClientApp::PaymentId,
                            )
                            .to(PartnerPayments::Table, PartnerPayments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-partner_payments_by_client_app-client_app_id")
                    .table(PartnerPaymentsByClientApp::Table)
                    .col(PartnerPaymentsByClientApp::ClientAppId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-partner_payments_by_client_app-payment_id")
                    .table(PartnerPaymentsByClientApp::Table)
                    .col(PartnerPaymentsByClientApp::PaymentId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Debts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Debts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Debts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Debts::Kind).string().not_null())
                    .col(ColumnDef::new(Debts::Debtor).string().not_null())
                    .col(ColumnDef::new(Debts::Creditor).string().not_null())
                    .col(
                        ColumnDef::new(Debts::BaseAmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Debts::Description).string())
                    .col(ColumnDef::new(Debts::Status).string().not_null())
                    .col(ColumnDef::new(Debts::Assignee).string())
                    .col(ColumnDef::new(Debts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Debt payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DebtPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DebtPayments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DebtPayments::DebtId).uuid().not_null())
                    .col(
                        ColumnDef::new(DebtPayments::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DebtPayments::PaidAt).timestamp().not_null())
                    .col(ColumnDef::new(DebtPayments::Notes).string())
                    .col(ColumnDef::new(DebtPayments::Recipient).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debt_payments-debt_id")
                            .from(DebtPayments::Table, DebtPayments::DebtId)
                            .to(Debts::Table, Debts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debt_payments-debt_id")
                    .table(DebtPayments::Table)
                    .col(DebtPayments::DebtId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. Payment recipients
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PaymentRecipients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentRecipients::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentRecipients::Label).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_recipients-label-unique")
                    .table(PaymentRecipients::Table)
                    .col(PaymentRecipients::Label)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentRecipients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DebtPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Debts::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(PartnerPaymentsByClientApp::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(PartnerPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PartnerAppSplits::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ClientPartnerAssignments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(ClientApps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Partners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        Ok(())
    }
}
