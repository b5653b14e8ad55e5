//! Integration tests for member removal.

mod common;

use std::sync::Arc;

use common::{admin, date, dues_account, member, memory_config, open, open_with};
use dernek_core::dues::PaymentMethod;
use dernek_core::members::{MemberProjection, MemberStatus};
use dernek_db::repositories::AddPaymentInput;
use dernek_db::{LedgerFilter, MemberDirectory, StaticMemberDirectory};
use dernek_shared::config::MemberDeletionMode;
use dernek_shared::types::MemberId;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_soft_delete_keeps_history() {
    let t = open().await;
    let m = member(&t.store, "Ayrılan", None).await;
    let ctx = admin();
    t.store.dues().ensure_record(&ctx, m.id, 2025).await.unwrap();

    t.store.remove_member(&ctx, m.id).await.unwrap();

    let directory = t.store.member_directory();
    let stored = directory.get(m.id).await.unwrap().unwrap();
    assert_eq!(stored.status, MemberStatus::Departed);
    assert!(directory.list_active().await.unwrap().is_empty());
    assert_eq!(t.store.dues().list_records(Some(m.id), None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cascade_delete_unlinks_promoted_income() {
    let mut config = memory_config();
    config.members.deletion_mode = MemberDeletionMode::Cascade;
    let t = open_with(config).await;
    dues_account(&t.store).await;
    let m = member(&t.store, "Silinen", None).await;
    let ctx = admin();

    let record = t.store.dues().ensure_record(&ctx, m.id, 2025).await.unwrap();
    t.store
        .dues()
        .add_payment(
            &ctx,
            AddPaymentInput {
                record_id: record.id,
                date: date(2025, 1, 1),
                amount: dec!(100),
                note: None,
                method: PaymentMethod::Cash,
                receipt_ref: None,
            },
        )
        .await
        .unwrap();

    t.store.remove_member(&ctx, m.id).await.unwrap();

    assert!(t.store.member_directory().get(m.id).await.unwrap().is_none());
    assert!(t.store.dues().list_records(Some(m.id), None).await.unwrap().is_empty());
    let incomes = t.store.income().list(LedgerFilter::default()).await.unwrap();
    assert_eq!(incomes.len(), 1);
    assert!(incomes[0].aidat_id.is_none());

    let err = t.store.remove_member(&ctx, m.id).await.unwrap_err();
    assert_eq!(err.kind(), Some(dernek_core::ErrorKind::NotFound));
}

#[tokio::test]
async fn test_static_directory_feeds_dues() {
    let t = open().await;
    let outside = MemberProjection {
        id: MemberId(42),
        name: "Dış Kayıt".to_string(),
        custom_annual_dues: Some(dec!(75)),
        discount_percent: None,
        status: MemberStatus::Active,
    };
    let store = t
        .store
        .clone()
        .with_members(Arc::new(StaticMemberDirectory::new(vec![outside])));

    let created = store.dues().bulk_generate(&admin(), 2025, None).await.unwrap();
    assert_eq!(created, 1);
    let records = store.dues().list_records(Some(MemberId(42)), Some(2025)).await.unwrap();
    assert_eq!(records[0].owed, dec!(75));
}
