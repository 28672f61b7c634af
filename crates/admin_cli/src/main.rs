//! Operator CLI for Refdesk: directory management, payout reconciliation,
//! debt tracking, and balance reports over the shared engine.

use std::{error::Error, io::Write};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{DebtKind, Engine, MoneyCents, ShareBps, Split, UnmarkOutcome};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

mod settings;
mod views;

#[derive(Parser, Debug)]
#[command(name = "refdesk_admin")]
#[command(about = "Admin utilities for Refdesk (partners, payouts, debts, reports)")]
struct Cli {
    /// Database connection string; overrides the config file
    /// (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Client(Client),
    Partner(Partner),
    Assign(Assign),
    Split(SplitCmd),
    App(App),
    Payout(Payout),
    Debt(Debt),
    Recipient(Recipient),
    Report(Report),
}

#[derive(Args, Debug)]
struct Client {
    #[command(subcommand)]
    command: ClientCommand,
}

#[derive(Subcommand, Debug)]
enum ClientCommand {
    Create(ClientCreateArgs),
    Update(ClientUpdateArgs),
    List,
}

#[derive(Args, Debug)]
struct ClientCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct ClientUpdateArgs {
    #[arg(long)]
    client: Uuid,
    #[arg(long)]
    name: String,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct Partner {
    #[command(subcommand)]
    command: PartnerCommand,
}

#[derive(Subcommand, Debug)]
enum PartnerCommand {
    Create(PartnerCreateArgs),
    Update(PartnerUpdateArgs),
    List,
    /// Set the partner's default split (must sum to 100%).
    SetDefault(PartnerDefaultArgs),
}

#[derive(Args, Debug)]
struct PartnerUpdateArgs {
    #[arg(long)]
    partner: Uuid,
    #[arg(long)]
    name: String,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct PartnerCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    contact: Option<String>,
    /// Partner share, percent (e.g. "25" or "12.5").
    #[arg(long, value_parser = parse_share)]
    partner_share: Option<ShareBps>,
    /// Owner share, percent.
    #[arg(long, value_parser = parse_share)]
    owner_share: Option<ShareBps>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct PartnerDefaultArgs {
    #[arg(long)]
    partner: Uuid,
    #[arg(long, value_parser = parse_share)]
    partner_share: ShareBps,
    #[arg(long, value_parser = parse_share)]
    owner_share: ShareBps,
}

#[derive(Args, Debug)]
struct Assign {
    #[command(subcommand)]
    command: AssignCommand,
}

#[derive(Subcommand, Debug)]
enum AssignCommand {
    Create(AssignCreateArgs),
    Remove(AssignPairArgs),
    List(PartnerRefArgs),
}

#[derive(Args, Debug)]
struct AssignCreateArgs {
    #[arg(long)]
    client: Uuid,
    #[arg(long)]
    partner: Uuid,
    /// Optional split override for this client, percent.
    #[arg(long, value_parser = parse_share)]
    partner_share: Option<ShareBps>,
    #[arg(long, value_parser = parse_share)]
    owner_share: Option<ShareBps>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct AssignPairArgs {
    #[arg(long)]
    client: Uuid,
    #[arg(long)]
    partner: Uuid,
}

#[derive(Args, Debug)]
struct PartnerRefArgs {
    #[arg(long)]
    partner: Uuid,
}

#[derive(Args, Debug)]
struct SplitCmd {
    #[command(subcommand)]
    command: SplitCommand,
}

#[derive(Subcommand, Debug)]
enum SplitCommand {
    /// Pin the split for one (partner, app) pair.
    Set(SplitSetArgs),
    /// Drop a pin; the app falls back to assignment/partner defaults.
    Remove(SplitRemoveArgs),
}

#[derive(Args, Debug)]
struct SplitSetArgs {
    #[arg(long)]
    partner: Uuid,
    #[arg(long)]
    app: Uuid,
    #[arg(long, value_parser = parse_share)]
    partner_share: ShareBps,
    #[arg(long, value_parser = parse_share)]
    owner_share: ShareBps,
}

#[derive(Args, Debug)]
struct SplitRemoveArgs {
    #[arg(long)]
    partner: Uuid,
    #[arg(long)]
    app: Uuid,
}

#[derive(Args, Debug)]
struct App {
    #[command(subcommand)]
    command: AppCommand,
}

#[derive(Subcommand, Debug)]
enum AppCommand {
    Create(AppCreateArgs),
    List(AppListArgs),
}

#[derive(Args, Debug)]
struct AppCreateArgs {
    #[arg(long)]
    client: Uuid,
    #[arg(long)]
    name: String,
    /// Profit in euros (e.g. "125" or "99,90").
    #[arg(long, value_parser = parse_money)]
    profit: MoneyCents,
    /// Completion timestamp, RFC 3339 (defaults to now).
    #[arg(long, value_parser = parse_utc)]
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct AppListArgs {
    #[arg(long)]
    client: Uuid,
}

#[derive(Args, Debug)]
struct Payout {
    #[command(subcommand)]
    command: PayoutCommand,
}

#[derive(Subcommand, Debug)]
enum PayoutCommand {
    /// Settle completed app rows: one aggregate payment plus audit rows.
    Mark(PayoutMarkArgs),
    /// Reverse the payout of one app row (asks for confirmation).
    Unmark(PayoutUnmarkArgs),
    /// Record a manual payment not tied to app rows.
    Record(PayoutRecordArgs),
    List(PartnerRefArgs),
}

#[derive(Args, Debug)]
struct PayoutMarkArgs {
    #[arg(long)]
    partner: Uuid,
    /// App row ids to settle (repeatable).
    #[arg(long = "app", required = true)]
    apps: Vec<Uuid>,
    #[arg(long, value_parser = parse_utc)]
    paid_at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct PayoutUnmarkArgs {
    #[arg(long)]
    partner: Uuid,
    #[arg(long)]
    app: Uuid,
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
}

#[derive(Args, Debug)]
struct PayoutRecordArgs {
    #[arg(long)]
    partner: Uuid,
    #[arg(long, value_parser = parse_money)]
    amount: MoneyCents,
    #[arg(long)]
    note: Option<String>,
    #[arg(long, value_parser = parse_utc)]
    paid_at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct Debt {
    #[command(subcommand)]
    command: DebtCommand,
}

#[derive(Subcommand, Debug)]
enum DebtCommand {
    Create(DebtCreateArgs),
    /// Record a payment against a debt.
    Pay(DebtPayArgs),
    /// Pay off the remaining balance in one final payment (asks for
    /// confirmation).
    Settle(DebtSettleArgs),
    List,
    Payments(DebtRefArgs),
}

#[derive(Args, Debug)]
struct DebtCreateArgs {
    /// "referral" or "deposit".
    #[arg(long, value_parser = parse_debt_kind)]
    kind: DebtKind,
    #[arg(long)]
    debtor: String,
    /// Ignored for deposits, which are always owed to the business.
    #[arg(long, default_value = "Business")]
    creditor: String,
    #[arg(long, value_parser = parse_money)]
    amount: MoneyCents,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    assignee: Option<String>,
}

#[derive(Args, Debug)]
struct DebtPayArgs {
    #[arg(long)]
    debt: Uuid,
    #[arg(long, value_parser = parse_money)]
    amount: MoneyCents,
    #[arg(long)]
    recipient: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long, value_parser = parse_utc)]
    paid_at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct DebtSettleArgs {
    #[arg(long)]
    debt: Uuid,
    #[arg(long)]
    recipient: Option<String>,
    #[arg(long)]
    yes: bool,
}

#[derive(Args, Debug)]
struct DebtRefArgs {
    #[arg(long)]
    debt: Uuid,
}

#[derive(Args, Debug)]
struct Recipient {
    #[command(subcommand)]
    command: RecipientCommand,
}

#[derive(Subcommand, Debug)]
enum RecipientCommand {
    Add(RecipientAddArgs),
    List,
}

#[derive(Args, Debug)]
struct RecipientAddArgs {
    #[arg(long)]
    label: String,
}

#[derive(Args, Debug)]
struct Report {
    #[command(subcommand)]
    command: ReportCommand,
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Per-client profit breakdown for a partner.
    Breakdown(PartnerRefArgs),
    /// Balance summary: earned share minus everything already paid.
    Balance(PartnerRefArgs),
    /// Earned share per month of app completion.
    Monthly(PartnerRefArgs),
}

fn parse_money(raw: &str) -> Result<MoneyCents, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn parse_share(raw: &str) -> Result<ShareBps, String> {
    ShareBps::from_percent_str(raw).map_err(|err| format!("{err}"))
}

fn parse_utc(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| format!("{err}"))
}

fn parse_debt_kind(raw: &str) -> Result<DebtKind, String> {
    match raw {
        "referral" => Ok(DebtKind::Referral),
        "deposit" => Ok(DebtKind::Deposit),
        other => Err(format!("unsupported debt kind: {other}")),
    }
}

fn optional_split(
    partner_share: Option<ShareBps>,
    owner_share: Option<ShareBps>,
) -> Result<Option<Split>, Box<dyn Error + Send + Sync>> {
    match (partner_share, owner_share) {
        (None, None) => Ok(None),
        (Some(partner), Some(owner)) => Ok(Some(Split::validated(partner, owner)?)),
        _ => Err("both --partner-share and --owner-share are required together".into()),
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// y/N prompt on stderr; anything but `y` declines.
fn confirm(prompt: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(format!("{prompt} [y/N] "))
    )?;
    out.flush()?;

    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) => {
                execute!(out, Print(format!("{ch}\r\n")))?;
                return Ok(ch.eq_ignore_ascii_case(&'y'));
            }
            KeyCode::Enter | KeyCode::Esc => {
                execute!(out, Print("\r\n"))?;
                return Ok(false);
            }
            _ => {}
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "refdesk_admin={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let database_url = cli
        .database_url
        .unwrap_or_else(|| settings.database.url());
    let db = connect_db(&database_url).await?;
    let engine = Engine::builder().database(db.clone()).build().await?;

    let result = match cli.command {
        Command::Client(Client { command }) => run_client(&engine, command).await,
        Command::Partner(Partner { command }) => run_partner(&engine, command).await,
        Command::Assign(Assign { command }) => run_assign(&engine, command).await,
        Command::Split(SplitCmd { command }) => run_split(&engine, command).await,
        Command::App(App { command }) => run_app(&engine, command).await,
        Command::Payout(Payout { command }) => run_payout(&engine, command).await,
        Command::Debt(Debt { command }) => run_debt(&engine, command).await,
        Command::Recipient(Recipient { command }) => run_recipient(&engine, command).await,
        Command::Report(Report { command }) => run_report(&engine, command).await,
    };
    if let Err(err) = &result {
        tracing::error!("command failed: {err}");
    }
    result
}

async fn run_client(
    engine: &Engine,
    command: ClientCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        ClientCommand::Create(args) => {
            let id = engine
                .new_client(&args.name, args.contact.as_deref(), args.notes.as_deref())
                .await?;
            println!("created client: {} ({id})", args.name);
        }
        ClientCommand::Update(args) => {
            engine
                .update_client(
                    args.client,
                    &args.name,
                    args.contact.as_deref(),
                    args.notes.as_deref(),
                )
                .await?;
            println!("updated client {}", args.client);
        }
        ClientCommand::List => {
            let clients = engine.list_clients().await?;
            print_json(&clients.iter().map(views::client).collect::<Vec<_>>())?;
        }
    }
    Ok(())
}

async fn run_partner(
    engine: &Engine,
    command: PartnerCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        PartnerCommand::Create(args) => {
            let default_split = optional_split(args.partner_share, args.owner_share)?;
            let id = engine
                .new_partner(
                    &args.name,
                    args.contact.as_deref(),
                    default_split,
                    args.notes.as_deref(),
                )
                .await?;
            println!("created partner: {} ({id})", args.name);
        }
        PartnerCommand::Update(args) => {
            engine
                .update_partner(
                    args.partner,
                    &args.name,
                    args.contact.as_deref(),
                    args.notes.as_deref(),
                )
                .await?;
            println!("updated partner {}", args.partner);
        }
        PartnerCommand::List => {
            let partners = engine.list_partners().await?;
            print_json(&partners.iter().map(views::partner).collect::<Vec<_>>())?;
        }
        PartnerCommand::SetDefault(args) => {
            let split = Split::validated(args.partner_share, args.owner_share)?;
            engine.set_partner_defaults(args.partner, split).await?;
            println!("updated default split for partner {}", args.partner);
        }
    }
    Ok(())
}

async fn run_assign(
    engine: &Engine,
    command: AssignCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        AssignCommand::Create(args) => {
            let override_split = optional_split(args.partner_share, args.owner_share)?;
            let id = engine
                .assign_client(
                    args.client,
                    args.partner,
                    override_split,
                    args.notes.as_deref(),
                )
                .await?;
            println!("created assignment: {id}");
        }
        AssignCommand::Remove(args) => {
            engine.unassign_client(args.client, args.partner).await?;
            println!("removed assignment");
        }
        AssignCommand::List(args) => {
            let assignments = engine.list_assignments(args.partner).await?;
            print_json(&assignments.iter().map(views::assignment).collect::<Vec<_>>())?;
        }
    }
    Ok(())
}

async fn run_split(
    engine: &Engine,
    command: SplitCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        SplitCommand::Set(args) => {
            let split = Split::validated(args.partner_share, args.owner_share)?;
            engine.set_app_split(args.partner, args.app, split).await?;
            println!("pinned split for app {}", args.app);
        }
        SplitCommand::Remove(args) => {
            engine.delete_app_split(args.partner, args.app).await?;
            println!("removed split pin for app {}", args.app);
        }
    }
    Ok(())
}

async fn run_app(engine: &Engine, command: AppCommand) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        AppCommand::Create(args) => {
            let completed_at = args.completed_at.or_else(|| Some(Utc::now()));
            let id = engine
                .new_client_app(args.client, &args.name, args.profit, completed_at)
                .await?;
            println!("created app row: {} ({id})", args.name);
        }
        AppCommand::List(args) => {
            let apps = engine.list_client_apps(args.client).await?;
            print_json(&apps.iter().map(views::client_app).collect::<Vec<_>>())?;
        }
    }
    Ok(())
}

async fn run_payout(
    engine: &Engine,
    command: PayoutCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        PayoutCommand::Mark(args) => {
            let paid_at = args.paid_at.unwrap_or_else(Utc::now);
            let payment_id = engine
                .mark_apps_paid(args.partner, &args.apps, paid_at)
                .await?;
            println!("marked {} app row(s) paid: payment {payment_id}", args.apps.len());
        }
        PayoutCommand::Unmark(args) => {
            if !args.yes && !confirm(&format!("Unmark app row {}?", args.app))? {
                println!("aborted");
                return Ok(());
            }
            match engine.unmark_app_paid(args.partner, args.app).await? {
                UnmarkOutcome::PaymentReduced {
                    payment_id,
                    remaining_amount,
                } => println!("reduced payment {payment_id} to {remaining_amount}"),
                UnmarkOutcome::PaymentDeleted { payment_id } => {
                    println!("deleted payment {payment_id}");
                }
                UnmarkOutcome::PaymentNotFound => {
                    println!("no matching payment found; audit row removed");
                }
            }
        }
        PayoutCommand::Record(args) => {
            let paid_at = args.paid_at.unwrap_or_else(Utc::now);
            let id = engine
                .record_partner_payment(args.partner, args.amount, args.note.as_deref(), paid_at)
                .await?;
            println!("recorded payment: {id}");
        }
        PayoutCommand::List(args) => {
            let payments = engine.list_partner_payments(args.partner).await?;
            print_json(&payments.iter().map(views::payment).collect::<Vec<_>>())?;
        }
    }
    Ok(())
}

async fn run_debt(
    engine: &Engine,
    command: DebtCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        DebtCommand::Create(args) => {
            let id = engine
                .new_debt(
                    args.kind,
                    &args.debtor,
                    &args.creditor,
                    args.amount,
                    args.description.as_deref(),
                    args.assignee.as_deref(),
                    Utc::now(),
                )
                .await?;
            println!("created debt: {id}");
        }
        DebtCommand::Pay(args) => {
            let paid_at = args.paid_at.unwrap_or_else(Utc::now);
            let id = engine
                .record_debt_payment(
                    args.debt,
                    args.amount,
                    args.recipient.as_deref(),
                    args.notes.as_deref(),
                    paid_at,
                )
                .await?;
            println!("recorded debt payment: {id}");
        }
        DebtCommand::Settle(args) => {
            let (_, totals) = engine.debt_view(args.debt).await?;
            if !args.yes
                && !confirm(&format!(
                    "Settle debt {} (remaining {})?",
                    args.debt, totals.remaining
                ))?
            {
                println!("aborted");
                return Ok(());
            }
            match engine
                .settle_debt(args.debt, args.recipient.as_deref(), Utc::now())
                .await?
            {
                Some(id) => println!("settled with final payment: {id}"),
                None => println!("already paid in full; status set to settled"),
            }
        }
        DebtCommand::List => {
            let debts = engine.list_debts().await?;
            print_json(
                &debts
                    .iter()
                    .map(|(debt, totals)| views::debt(debt, totals))
                    .collect::<Vec<_>>(),
            )?;
        }
        DebtCommand::Payments(args) => {
            let payments = engine.list_debt_payments(args.debt).await?;
            print_json(&payments.iter().map(views::debt_payment).collect::<Vec<_>>())?;
        }
    }
    Ok(())
}

async fn run_recipient(
    engine: &Engine,
    command: RecipientCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        RecipientCommand::Add(args) => {
            let id = engine.add_payment_recipient(&args.label).await?;
            println!("added recipient: {} ({id})", args.label);
        }
        RecipientCommand::List => {
            let recipients = engine.list_payment_recipients().await?;
            print_json(&recipients.iter().map(views::recipient).collect::<Vec<_>>())?;
        }
    }
    Ok(())
}

async fn run_report(
    engine: &Engine,
    command: ReportCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        ReportCommand::Breakdown(args) => {
            let breakdown = engine.partner_breakdown(args.partner).await?;
            print_json(&breakdown.iter().map(views::breakdown_row).collect::<Vec<_>>())?;
        }
        ReportCommand::Balance(args) => {
            let balance = engine.partner_balance(args.partner).await?;
            print_json(&views::balance(&balance))?;
        }
        ReportCommand::Monthly(args) => {
            let series = engine.partner_monthly_series(args.partner).await?;
            print_json(&series.iter().map(views::monthly_point).collect::<Vec<_>>())?;
        }
    }
    Ok(())
}
