//! Development data seeder for the ledger store.
//!
//! Creates the default dues account, a handful of members with dues
//! records and one booked income, then prints a simulated closure of the
//! previous year.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use chrono::{Datelike, Local};
use dernek_core::audit::TracingAuditSink;
use dernek_core::auth::ActorContext;
use dernek_core::dues::PaymentMethod;
use dernek_core::ledger::IncomeCategory;
use dernek_db::repositories::{AddPaymentInput, CreateAccountInput, NewIncomeInput};
use dernek_db::{MemberDirectory, NewMemberInput, Store};
use dernek_shared::AppConfig;
use dernek_shared::types::{CashAccountId, Currency};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Demo members: name, custom dues, discount percent.
const MEMBERS: [(&str, Option<Decimal>, Option<Decimal>); 3] = [
    ("Ayşe Yılmaz", None, None),
    ("Mehmet Demir", Some(dec!(250)), None),
    ("Fatma Kaya", None, Some(dec!(50))),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dernek=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let store = Store::open(config, Arc::new(TracingAuditSink)).await?;
    info!(backend = %store.backend(), "store opened");

    let ctx = ActorContext::system();
    let account_id = seed_account(&store, &ctx).await?;
    seed_members(&store, &ctx).await?;
    seed_income(&store, &ctx, account_id).await?;

    let previous_year = Local::now().year() - 1;
    match store.closing().close_year(&ctx, previous_year, true).await {
        Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        Err(e) => warn!(year = previous_year, error = %e, "closure preview unavailable"),
    }

    Ok(())
}

async fn seed_account(store: &Store, ctx: &ActorContext) -> anyhow::Result<CashAccountId> {
    let accounts = store.cash_accounts();
    let name = store.config().dues.default_account_name.clone();

    if let Some(existing) = accounts.find_by_name(&name).await? {
        info!(account = %name, "dues account already exists, skipping");
        return Ok(CashAccountId(existing.kasa_id));
    }

    let created = accounts
        .create(
            ctx,
            CreateAccountInput {
                name,
                currency: Currency::Tl,
                opening_balance: dec!(1000),
            },
        )
        .await?;
    info!(account_id = created.kasa_id, "dues account created");
    Ok(CashAccountId(created.kasa_id))
}

async fn seed_members(store: &Store, ctx: &ActorContext) -> anyhow::Result<()> {
    let directory = store.member_directory();
    if !directory.list_active().await?.is_empty() {
        info!("members already exist, skipping");
        return Ok(());
    }

    let dues = store.dues();
    let today = Local::now().date_naive();

    for (name, custom_annual_dues, discount_percent) in MEMBERS {
        let member = directory
            .add(NewMemberInput {
                name: name.to_string(),
                custom_annual_dues,
                discount_percent,
            })
            .await?;

        let record = dues.ensure_record(ctx, member.id, today.year()).await?;
        let change = dues
            .add_payment(
                ctx,
                AddPaymentInput {
                    record_id: record.id,
                    date: today,
                    amount: dec!(100),
                    note: None,
                    method: PaymentMethod::Cash,
                    receipt_ref: None,
                },
            )
            .await?;
        info!(member = name, status = %change.record.status, "member seeded");
    }

    Ok(())
}

async fn seed_income(
    store: &Store,
    ctx: &ActorContext,
    account_id: CashAccountId,
) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let income = store
        .income()
        .add_single_year(
            ctx,
            NewIncomeInput {
                date: today,
                category: IncomeCategory::Donation,
                description: "Yıllık bağış kampanyası".to_string(),
                amount: dec!(500),
                account_id,
                belongs_to_year: None,
                accrual_status: None,
            },
        )
        .await?;
    info!(document = %income.belge_no, "donation booked");
    Ok(())
}
