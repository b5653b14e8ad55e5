//! Integration tests for year-end closing.

mod common;

use common::{account, admin, date, open, secretary};
use dernek_core::accrual::{AccrualKind, AccrualState};
use dernek_core::closing::ClosureWarningKind;
use dernek_core::ledger::IncomeCategory;
use dernek_core::ErrorKind;
use dernek_db::repositories::{NewExpenseInput, NewIncomeInput, NewTransferInput};
use dernek_db::Store;
use dernek_shared::types::{CashAccountId, IncomeId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn income(
    store: &Store,
    account_id: CashAccountId,
    on: chrono::NaiveDate,
    amount: Decimal,
    year: i32,
) -> i32 {
    store
        .income()
        .add_single_year(
            &admin(),
            NewIncomeInput {
                date: on,
                category: IncomeCategory::Donation,
                description: "Bağış".to_string(),
                amount,
                account_id,
                belongs_to_year: Some(year),
                accrual_status: None,
            },
        )
        .await
        .unwrap()
        .gelir_id
}

async fn expense(
    store: &Store,
    account_id: CashAccountId,
    on: chrono::NaiveDate,
    amount: Decimal,
) {
    store
        .expenses()
        .add_single_year(
            &admin(),
            NewExpenseInput {
                date: on,
                category: "Elektrik".to_string(),
                description: "Fatura".to_string(),
                amount,
                account_id,
                belongs_to_year: None,
                accrual_status: None,
            },
        )
        .await
        .unwrap();
}

/// Account with 1000 income, 200 expense and 300 collected for 2026.
async fn seeded(store: &Store) -> (CashAccountId, i32) {
    let id = CashAccountId(account(store, "DERNEK KASA TL", Decimal::ZERO).await.kasa_id);
    income(store, id, date(2025, 3, 1), dec!(1000), 2025).await;
    expense(store, id, date(2025, 4, 1), dec!(200)).await;
    let prepaid = income(store, id, date(2025, 5, 1), dec!(300), 2026).await;
    (id, prepaid)
}

#[tokio::test]
async fn test_simulation_writes_nothing() {
    let t = open().await;
    let (id, _) = seeded(&t.store).await;
    let closing = t.store.closing();

    let report = closing.close_year(&secretary(), 2025, true).await.unwrap();
    assert!(report.simulated);
    assert_eq!(report.closure_date, date(2025, 12, 31));
    assert_eq!(report.accounts.len(), 1);
    let account = &report.accounts[0];
    assert_eq!(account.physical, dec!(1100));
    assert_eq!(account.accrued_income, dec!(300));
    assert_eq!(account.free, dec!(800));
    assert_eq!(account.by_year.len(), 1);
    assert_eq!(account.by_year[0].year, 2026);
    assert!(!report.has_warnings());

    assert!(closing.list_closures().await.unwrap().is_empty());
    let stored = t.store.cash_accounts().find(id).await.unwrap().unwrap();
    assert!(stored.son_devir_tarihi.is_none());
    assert_eq!(stored.devir_bakiye, Decimal::ZERO);
}

#[tokio::test]
async fn test_confirmed_closure_carries_balances_forward() {
    let t = open().await;
    let (id, prepaid) = seeded(&t.store).await;
    let closing = t.store.closing();
    let ctx = admin();

    let report = closing.close_year(&ctx, 2025, false).await.unwrap();
    assert!(!report.simulated);

    let stored = t.store.cash_accounts().find(id).await.unwrap().unwrap();
    assert_eq!(stored.devir_bakiye, dec!(1100));
    assert_eq!(stored.serbest_devir_bakiye, dec!(800));
    assert_eq!(stored.tahakkuk_toplami, dec!(300));
    assert_eq!(stored.son_devir_tarihi, Some(date(2025, 12, 31)));

    let row = closing.find_closure(2025).await.unwrap().unwrap();
    assert_eq!(row.toplam_fiziksel, dec!(1100));
    assert_eq!(row.toplam_tahakkuk, dec!(300));
    assert_eq!(row.toplam_serbest, dec!(800));
    let stored_report = closing.find_report(2025).await.unwrap().unwrap();
    assert_eq!(stored_report, report);

    // The 2026 accrual stays earmarked until 2026 is closed.
    let accruals = t.store.accruals().for_source(AccrualKind::Income, prepaid).await.unwrap();
    assert_eq!(accruals[0].state, AccrualState::Active);

    // The opening balance already contains 2025.
    income(&t.store, id, date(2026, 2, 1), dec!(50), 2026).await;
    let balance = t
        .store
        .cash_accounts()
        .balance(id, Some(date(2026, 12, 31)))
        .await
        .unwrap();
    assert_eq!(balance.opening, dec!(1100));
    assert_eq!(balance.total_income, dec!(50));
    assert_eq!(balance.net, dec!(1150));

    let err = t
        .store
        .cash_accounts()
        .balance(id, Some(date(2025, 6, 1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));

    closing.close_year(&ctx, 2026, false).await.unwrap();
    let accruals = t.store.accruals().for_source(AccrualKind::Income, prepaid).await.unwrap();
    assert_eq!(accruals[0].state, AccrualState::Consumed);
    let stored = t.store.cash_accounts().find(id).await.unwrap().unwrap();
    assert_eq!(stored.devir_bakiye, dec!(1150));
    assert_eq!(stored.serbest_devir_bakiye, dec!(1150));
    assert_eq!(stored.tahakkuk_toplami, Decimal::ZERO);
}

#[tokio::test]
async fn test_reclosing_a_year_conflicts() {
    let t = open().await;
    let (id, _) = seeded(&t.store).await;
    let closing = t.store.closing();
    let ctx = admin();

    closing.close_year(&ctx, 2025, false).await.unwrap();
    let first = closing.find_closure(2025).await.unwrap().unwrap();

    let err = closing.close_year(&ctx, 2025, false).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));
    let err = closing.compute_closure(&ctx, id, 2025, false).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));
    let err = closing.close_year(&ctx, 2024, false).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));

    let closures = closing.list_closures().await.unwrap();
    assert_eq!(closures, vec![first]);
}

#[tokio::test]
async fn test_single_account_closure() {
    let t = open().await;
    let (id, _) = seeded(&t.store).await;
    let other = CashAccountId(account(&t.store, "BANKA", dec!(50)).await.kasa_id);
    let closing = t.store.closing();

    let report = closing.compute_closure(&admin(), id, 2025, false).await.unwrap();
    assert_eq!(report.accounts.len(), 1);
    assert_eq!(report.totals.physical, dec!(1100));

    let untouched = t.store.cash_accounts().find(other).await.unwrap().unwrap();
    assert!(untouched.son_devir_tarihi.is_none());
}

#[tokio::test]
async fn test_single_account_closure_leaves_other_accruals_active() {
    let t = open().await;
    let (first, _) = seeded(&t.store).await;
    let second = CashAccountId(account(&t.store, "BANKA", Decimal::ZERO).await.kasa_id);
    let prepaid = income(&t.store, second, date(2024, 6, 1), dec!(300), 2025).await;
    let closing = t.store.closing();
    let ctx = admin();

    let year_end = date(2024, 12, 31);
    let before = t.store.cash_accounts().free_balance(second, year_end).await.unwrap();
    assert_eq!(before.free, Decimal::ZERO);

    closing.compute_closure(&ctx, first, 2025, false).await.unwrap();

    let accruals = t.store.accruals().for_source(AccrualKind::Income, prepaid).await.unwrap();
    assert_eq!(accruals[0].state, AccrualState::Active);
    let after = t.store.cash_accounts().free_balance(second, year_end).await.unwrap();
    assert_eq!(after, before);

    // The year stays open for the other account.
    let report = closing.close_year(&ctx, 2025, false).await.unwrap();
    assert_eq!(report.accounts.len(), 1);
    assert_eq!(report.accounts[0].account_id, second);
    assert_eq!(report.accounts[0].physical, dec!(300));
    assert_eq!(report.accounts[0].free, dec!(300));

    let accruals = t.store.accruals().for_source(AccrualKind::Income, prepaid).await.unwrap();
    assert_eq!(accruals[0].state, AccrualState::Consumed);

    let closures = closing.list_closures().await.unwrap();
    assert_eq!(closures.len(), 1);
    assert_eq!(closures[0].toplam_fiziksel, dec!(1400));
    assert_eq!(closures[0].toplam_serbest, dec!(1100));
    let stored = closing.find_report(2025).await.unwrap().unwrap();
    assert_eq!(stored.accounts.len(), 2);

    let err = closing.close_year(&ctx, 2025, false).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));
}

#[tokio::test]
async fn test_postings_into_closed_period_are_locked() {
    let t = open().await;
    let (first, prepaid) = seeded(&t.store).await;
    let second = CashAccountId(account(&t.store, "BANKA", dec!(100)).await.kasa_id);
    let ctx = admin();
    t.store.closing().compute_closure(&ctx, first, 2025, false).await.unwrap();

    let late = NewIncomeInput {
        date: date(2025, 6, 1),
        category: IncomeCategory::Donation,
        description: "Geç kayıt".to_string(),
        amount: dec!(40),
        account_id: first,
        belongs_to_year: None,
        accrual_status: None,
    };
    let err = t.store.income().add_single_year(&ctx, late.clone()).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Locked));

    let err = t
        .store
        .expenses()
        .add_single_year(
            &ctx,
            NewExpenseInput {
                date: date(2025, 12, 31),
                category: "Kira".to_string(),
                description: "Aralık".to_string(),
                amount: dec!(10),
                account_id: first,
                belongs_to_year: None,
                accrual_status: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Locked));

    let err = t.store.income().delete(&ctx, IncomeId(prepaid)).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Locked));

    let err = t
        .store
        .transfers()
        .add(
            &ctx,
            NewTransferInput {
                date: date(2025, 7, 1),
                from: second,
                to: first,
                amount: dec!(20),
                description: "Aktarım".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Locked));

    // The account still open for 2025 keeps accepting postings.
    t.store
        .income()
        .add_single_year(&ctx, NewIncomeInput { account_id: second, ..late.clone() })
        .await
        .unwrap();
    t.store
        .income()
        .add_single_year(&ctx, NewIncomeInput { date: date(2026, 1, 2), ..late })
        .await
        .unwrap();

    let stored = t.store.cash_accounts().find(first).await.unwrap().unwrap();
    assert_eq!(stored.devir_bakiye, dec!(1100));
}

#[tokio::test]
async fn test_warnings() {
    let t = open().await;
    let id = CashAccountId(account(&t.store, "RİSKLİ", Decimal::ZERO).await.kasa_id);
    income(&t.store, id, date(2025, 1, 10), dec!(500), 2026).await;
    expense(&t.store, id, date(2025, 2, 10), dec!(400)).await;

    let report = t.store.closing().close_year(&admin(), 2025, true).await.unwrap();
    let account = &report.accounts[0];
    assert_eq!(account.physical, dec!(100));
    assert_eq!(account.free, dec!(-400));

    let kinds: Vec<_> = report.warnings.iter().map(|w| w.kind).collect();
    assert!(kinds.contains(&ClosureWarningKind::NegativeFreeBalance));
    assert!(kinds.contains(&ClosureWarningKind::HighAccrualRatio));
}

#[tokio::test]
async fn test_confirmation_requires_permission() {
    let t = open().await;
    seeded(&t.store).await;

    let err = t.store.closing().close_year(&secretary(), 2025, false).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Forbidden));
    assert!(t.store.closing().list_closures().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_closing_without_accounts_fails() {
    let t = open().await;
    let err = t.store.closing().close_year(&admin(), 2025, true).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));
}
