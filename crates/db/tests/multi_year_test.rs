//! Integration tests for multi-year collections.

mod common;

use common::{account, admin, date, dues_account, member, open};
use dernek_core::accrual::{AccrualKind, AccrualState};
use dernek_core::auth::{ActorContext, Permission, UserRole};
use dernek_core::dues::{DuesStatus, PaymentMethod};
use dernek_core::ledger::{AccrualStatus, BatchId, IncomeCategory, MultiYearRequest};
use dernek_core::ErrorKind;
use dernek_db::repositories::{AddPaymentInput, MultiYearExpenseInput, MultiYearIncomeInput};
use dernek_db::LedgerFilter;
use dernek_shared::types::{CashAccountId, MemberId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn request(start_year: i32, end_year: i32, per_year_amount: Decimal) -> MultiYearRequest {
    MultiYearRequest {
        start_year,
        end_year,
        per_year_amount,
        collection_date: date(2025, 6, 1),
        description: "Aidat".to_string(),
    }
}

fn dues_batch(
    member_id: Option<MemberId>,
    account_id: CashAccountId,
    request: MultiYearRequest,
) -> MultiYearIncomeInput {
    MultiYearIncomeInput {
        member_id,
        category: IncomeCategory::Dues,
        account_id,
        request,
    }
}

#[tokio::test]
async fn test_three_year_dues_collection() {
    let t = open().await;
    let account_id = dues_account(&t.store).await;
    let m = member(&t.store, "Üç Yıllık", None).await;
    let ctx = admin();

    let before = t
        .store
        .cash_accounts()
        .free_balance(account_id, date(2025, 6, 30))
        .await
        .unwrap();

    let outcome = t
        .store
        .income()
        .add_multi_year(&ctx, dues_batch(Some(m.id), account_id, request(2025, 2027, dec!(100))))
        .await
        .unwrap();
    assert_eq!(outcome.batch_id, BatchId { year: 2025, sequence: 1 });
    assert_eq!(outcome.batch_id.to_string(), "GRUP_2025_1");

    let statuses: Vec<(i32, &str)> = outcome
        .records
        .iter()
        .map(|r| (r.ait_oldugu_yil, r.tahakkuk_durumu.as_str()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (2025, AccrualStatus::Normal.as_str()),
            (2026, AccrualStatus::Prepaid.as_str()),
            (2027, AccrualStatus::Prepaid.as_str()),
        ]
    );
    let total: Decimal = outcome.records.iter().map(|r| r.tutar).sum();
    assert_eq!(total, dec!(300));
    assert!(outcome.records.iter().all(|r| r.aidat_id.is_some()));
    assert!(outcome
        .records
        .iter()
        .all(|r| r.coklu_odeme_grup_id.as_deref() == Some("GRUP_2025_1")));

    let summary = t
        .store
        .accruals()
        .summary(date(2025, 6, 30), Some(account_id))
        .await
        .unwrap();
    assert_eq!(summary.len(), 2);
    let accrued: Decimal = summary.iter().map(|s| s.total_amount).sum();
    assert_eq!(accrued, dec!(200));

    let after = t
        .store
        .cash_accounts()
        .free_balance(account_id, date(2025, 6, 30))
        .await
        .unwrap();
    assert_eq!(after.physical - before.physical, dec!(300));
    assert_eq!(after.free - before.free, dec!(100));

    // Linked into the dues tracker without extra income rows.
    let dues = t.store.dues();
    let records = dues.list_records(Some(m.id), None).await.unwrap();
    assert_eq!(records.len(), 3);
    for (record, income) in records.iter().zip(&outcome.records) {
        assert_eq!(record.status, DuesStatus::Complete);
        assert_eq!(record.income_id.map(|id| id.into_inner()), Some(income.gelir_id));
        dues.verify_invariants(record.id).await.unwrap();

        let payments = dues.payments(record.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].tahsilat_turu, PaymentMethod::MultiYear.as_str());
        assert_eq!(payments[0].dekont_no.as_deref(), Some(income.belge_no.as_str()));
    }
    assert_eq!(t.store.income().list(LedgerFilter::default()).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_batches_are_numbered_per_collection_year() {
    let t = open().await;
    let account_id = CashAccountId(account(&t.store, "BANKA", Decimal::ZERO).await.kasa_id);
    let income = t.store.income();
    let ctx = admin();

    let donation = |req| MultiYearIncomeInput {
        member_id: None,
        category: IncomeCategory::Donation,
        account_id,
        request: req,
    };

    let first = income.add_multi_year(&ctx, donation(request(2025, 2026, dec!(10)))).await.unwrap();
    let second = income
        .add_multi_year(&ctx, donation(request(2024, 2025, dec!(10))))
        .await
        .unwrap();
    assert_eq!(first.batch_id.to_string(), "GRUP_2025_1");
    assert_eq!(second.batch_id.to_string(), "GRUP_2025_2");

    let listed = income
        .list(LedgerFilter {
            batch_id: Some(second.batch_id),
            ..LedgerFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].tahakkuk_durumu, AccrualStatus::Retroactive.as_str());
}

#[tokio::test]
async fn test_amount_mismatch_rolls_back_whole_batch() {
    let t = open().await;
    let account_id = dues_account(&t.store).await;
    let m = member(&t.store, "Özel Tutar", Some(dec!(150))).await;

    let err = t
        .store
        .income()
        .add_multi_year(
            &admin(),
            dues_batch(Some(m.id), account_id, request(2025, 2027, dec!(100))),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));

    assert!(t.store.income().list(LedgerFilter::default()).await.unwrap().is_empty());
    assert!(t.store.dues().list_records(Some(m.id), None).await.unwrap().is_empty());
    let summary = t.store.accruals().summary(date(2025, 6, 30), None).await.unwrap();
    assert!(summary.is_empty());
}

#[tokio::test]
async fn test_complete_year_rejects_batch() {
    let t = open().await;
    let account_id = dues_account(&t.store).await;
    let m = member(&t.store, "Ödemiş", None).await;
    let ctx = admin();
    let dues = t.store.dues();

    let record = dues.ensure_record(&ctx, m.id, 2026).await.unwrap();
    dues.add_payment(
        &ctx,
        AddPaymentInput {
            record_id: record.id,
            date: date(2025, 2, 1),
            amount: dec!(100),
            note: None,
            method: PaymentMethod::Bank,
            receipt_ref: Some("DK-1".to_string()),
        },
    )
    .await
    .unwrap();
    let incomes_before = t.store.income().list(LedgerFilter::default()).await.unwrap().len();

    let err = t
        .store
        .income()
        .add_multi_year(&ctx, dues_batch(Some(m.id), account_id, request(2025, 2026, dec!(100))))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));

    assert_eq!(
        t.store.income().list(LedgerFilter::default()).await.unwrap().len(),
        incomes_before
    );
    let records = dues.list_records(Some(m.id), None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].year, 2026);
}

#[tokio::test]
async fn test_partial_year_is_completed_by_batch() {
    let t = open().await;
    let account_id = dues_account(&t.store).await;
    let m = member(&t.store, "Kısmi", None).await;
    let ctx = admin();
    let dues = t.store.dues();

    let record = dues.ensure_record(&ctx, m.id, 2025).await.unwrap();
    dues.add_payment(
        &ctx,
        AddPaymentInput {
            record_id: record.id,
            date: date(2025, 1, 10),
            amount: dec!(40),
            note: Some("Elden".to_string()),
            method: PaymentMethod::Cash,
            receipt_ref: None,
        },
    )
    .await
    .unwrap();

    t.store
        .income()
        .add_multi_year(&ctx, dues_batch(Some(m.id), account_id, request(2025, 2025, dec!(100))))
        .await
        .unwrap();

    let view = &dues.list_records(Some(m.id), Some(2025)).await.unwrap()[0];
    assert_eq!(view.status, DuesStatus::Complete);
    assert_eq!(view.remaining, dec!(-40));
    dues.verify_invariants(view.id).await.unwrap();
    assert_eq!(t.store.income().list(LedgerFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_dues_category_is_not_linked() {
    let t = open().await;
    let account_id = dues_account(&t.store).await;
    let m = member(&t.store, "Kiracı", None).await;

    let outcome = t
        .store
        .income()
        .add_multi_year(
            &ActorContext::with_permissions(
                "sekreter",
                UserRole::Secretary,
                [Permission::CollectDues, Permission::CreateIncome],
            ),
            MultiYearIncomeInput {
                member_id: Some(m.id),
                category: IncomeCategory::Rent,
                account_id,
                request: request(2025, 2026, dec!(500)),
            },
        )
        .await
        .unwrap();
    assert!(outcome.records.iter().all(|r| r.aidat_id.is_none()));
    assert!(t.store.dues().list_records(Some(m.id), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_requests() {
    let t = open().await;
    let account_id = dues_account(&t.store).await;
    let income = t.store.income();
    let ctx = admin();

    let err = income
        .add_multi_year(&ctx, dues_batch(None, account_id, request(2027, 2025, dec!(100))))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));

    let err = income
        .add_multi_year(&ctx, dues_batch(None, account_id, request(2025, 2026, Decimal::ZERO)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));

    let err = income
        .add_multi_year(
            &ctx,
            dues_batch(Some(MemberId(404)), account_id, request(2025, 2026, dec!(100))),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    let err = income
        .add_multi_year(&ctx, dues_batch(None, CashAccountId(404), request(2025, 2026, dec!(100))))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_prepaid_expenses_raise_free_balance() {
    let t = open().await;
    let account_id = CashAccountId(account(&t.store, "KASA", dec!(1000)).await.kasa_id);

    let (batch_id, records) = t
        .store
        .expenses()
        .add_multi_year(
            &admin(),
            MultiYearExpenseInput {
                category: "Kira".to_string(),
                account_id,
                request: request(2025, 2026, dec!(300)),
            },
        )
        .await
        .unwrap();
    assert_eq!(batch_id.to_string(), "GRUP_2025_1");
    assert_eq!(records[0].islem_no, "GID000001");
    assert_eq!(records[1].islem_no, "GID000002");

    let accruals = t
        .store
        .accruals()
        .for_source(AccrualKind::Expense, records[1].gider_id)
        .await
        .unwrap();
    assert_eq!(accruals.len(), 1);
    assert_eq!(accruals[0].state, AccrualState::Active);

    let free = t
        .store
        .cash_accounts()
        .free_balance(account_id, date(2025, 12, 31))
        .await
        .unwrap();
    assert_eq!(free.physical, dec!(400));
    assert_eq!(free.accrued_expense, dec!(300));
    assert_eq!(free.free, dec!(700));
}
