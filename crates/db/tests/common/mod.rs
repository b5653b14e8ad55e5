//! Shared fixtures for repository tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use dernek_core::audit::MemoryAuditSink;
use dernek_core::auth::{ActorContext, UserRole};
use dernek_core::members::MemberProjection;
use dernek_db::entities::kasalar;
use dernek_db::repositories::CreateAccountInput;
use dernek_db::{NewMemberInput, Store};
use dernek_shared::config::{StoreConfig, StoreMode};
use dernek_shared::types::{CashAccountId, Currency};
use dernek_shared::AppConfig;
use rust_decimal::Decimal;

/// Name of the account receiving promoted dues in the default configuration.
pub const DUES_ACCOUNT: &str = "DERNEK KASA TL";

/// Migrated in-memory store with a recording audit sink.
pub struct TestStore {
    pub store: Store,
    pub audit: Arc<MemoryAuditSink>,
}

pub fn memory_config() -> AppConfig {
    AppConfig {
        store: StoreConfig {
            mode: StoreMode::Local,
            url: "sqlite::memory:".to_string(),
            replicate: false,
        },
        ..AppConfig::default()
    }
}

pub async fn open_with(config: AppConfig) -> TestStore {
    let audit = Arc::new(MemoryAuditSink::new());
    let store = Store::open(config, audit.clone())
        .await
        .expect("Failed to open in-memory store");
    TestStore { store, audit }
}

pub async fn open() -> TestStore {
    open_with(memory_config()).await
}

pub fn admin() -> ActorContext {
    ActorContext::new("test-admin", UserRole::Admin)
}

pub fn secretary() -> ActorContext {
    ActorContext::new("test-secretary", UserRole::Secretary)
}

pub fn viewer() -> ActorContext {
    ActorContext::new("test-viewer", UserRole::Viewer)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub async fn account(store: &Store, name: &str, opening: Decimal) -> kasalar::Model {
    store
        .cash_accounts()
        .create(
            &admin(),
            CreateAccountInput {
                name: name.to_string(),
                currency: Currency::Tl,
                opening_balance: opening,
            },
        )
        .await
        .expect("Failed to create account")
}

pub async fn dues_account(store: &Store) -> CashAccountId {
    CashAccountId(account(store, DUES_ACCOUNT, Decimal::ZERO).await.kasa_id)
}

pub async fn member(store: &Store, name: &str, custom: Option<Decimal>) -> MemberProjection {
    store
        .member_directory()
        .add(NewMemberInput {
            name: name.to_string(),
            custom_annual_dues: custom,
            discount_percent: None,
        })
        .await
        .expect("Failed to add member")
}
