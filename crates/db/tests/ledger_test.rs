//! Integration tests for cash accounts, incomes, expenses and transfers.

mod common;

use common::{account, admin, date, memory_config, open, open_with, viewer};
use dernek_core::accrual::{AccrualKind, AccrualState};
use dernek_core::ledger::{AccrualStatus, IncomeCategory};
use dernek_core::ErrorKind;
use dernek_db::repositories::{
    CreateAccountInput, NewExpenseInput, NewIncomeInput, NewTransferInput,
};
use dernek_db::LedgerFilter;
use dernek_shared::types::{CashAccountId, Currency, IncomeId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn income_input(
    account_id: CashAccountId,
    on: chrono::NaiveDate,
    amount: Decimal,
) -> NewIncomeInput {
    NewIncomeInput {
        date: on,
        category: IncomeCategory::Rent,
        description: "Salon kirası".to_string(),
        amount,
        account_id,
        belongs_to_year: None,
        accrual_status: None,
    }
}

fn expense_input(
    account_id: CashAccountId,
    on: chrono::NaiveDate,
    amount: Decimal,
) -> NewExpenseInput {
    NewExpenseInput {
        date: on,
        category: "Temizlik".to_string(),
        description: "Malzeme".to_string(),
        amount,
        account_id,
        belongs_to_year: None,
        accrual_status: None,
    }
}

#[tokio::test]
async fn test_balance_identity() {
    let t = open().await;
    let ctx = admin();
    let kasa = CashAccountId(account(&t.store, "KASA", dec!(500)).await.kasa_id);
    let banka = CashAccountId(account(&t.store, "BANKA", dec!(100)).await.kasa_id);

    t.store
        .income()
        .add_single_year(&ctx, income_input(kasa, date(2025, 1, 10), dec!(250.50)))
        .await
        .unwrap();
    t.store
        .income()
        .add_single_year(&ctx, income_input(kasa, date(2025, 7, 1), dec!(99.50)))
        .await
        .unwrap();
    t.store
        .expenses()
        .add_single_year(&ctx, expense_input(kasa, date(2025, 2, 1), dec!(120)))
        .await
        .unwrap();
    t.store
        .transfers()
        .add(
            &ctx,
            NewTransferInput {
                date: date(2025, 3, 1),
                from: kasa,
                to: banka,
                amount: dec!(200),
                description: "Bankaya yatırma".to_string(),
            },
        )
        .await
        .unwrap();

    let balance = t.store.cash_accounts().balance(kasa, None).await.unwrap();
    assert_eq!(balance.currency, Currency::Tl);
    assert_eq!(balance.opening, dec!(500));
    assert_eq!(balance.total_income, dec!(350));
    assert_eq!(balance.total_expense, dec!(120));
    assert_eq!(balance.transfers_out, dec!(200));
    assert_eq!(balance.transfers_in, Decimal::ZERO);
    assert_eq!(
        balance.net,
        balance.opening + balance.total_income - balance.total_expense - balance.transfers_out
            + balance.transfers_in
    );
    assert_eq!(balance.net, dec!(530));

    let banka_balance = t.store.cash_accounts().balance(banka, None).await.unwrap();
    assert_eq!(banka_balance.net, dec!(300));

    // Records after the cut-off date are ignored.
    let early = t
        .store
        .cash_accounts()
        .balance(kasa, Some(date(2025, 2, 15)))
        .await
        .unwrap();
    assert_eq!(early.total_income, dec!(250.50));
    assert_eq!(early.transfers_out, Decimal::ZERO);
    assert_eq!(early.net, dec!(630.50));

    let err = t.store.cash_accounts().balance(CashAccountId(999), None).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_document_numbers_are_sequential() {
    let t = open().await;
    let ctx = admin();
    let kasa = CashAccountId(account(&t.store, "KASA", Decimal::ZERO).await.kasa_id);

    let first = t
        .store
        .income()
        .add_single_year(&ctx, income_input(kasa, date(2025, 1, 1), dec!(10)))
        .await
        .unwrap();
    let second = t
        .store
        .income()
        .add_single_year(&ctx, income_input(kasa, date(2025, 1, 2), dec!(10)))
        .await
        .unwrap();
    let spent = t
        .store
        .expenses()
        .add_single_year(&ctx, expense_input(kasa, date(2025, 1, 3), dec!(5)))
        .await
        .unwrap();
    assert_eq!(first.belge_no, "GEL000001");
    assert_eq!(second.belge_no, "GEL000002");
    assert_eq!(spent.islem_no, "GID000001");

    // Numbering continues from the highest number still in use.
    t.store.income().delete(&ctx, IncomeId(first.gelir_id)).await.unwrap();
    let third = t
        .store
        .income()
        .add_single_year(&ctx, income_input(kasa, date(2025, 1, 4), dec!(10)))
        .await
        .unwrap();
    assert_eq!(third.belge_no, "GEL000003");
}

#[tokio::test]
async fn test_income_defaults_and_overrides() {
    let t = open().await;
    let ctx = admin();
    let kasa = CashAccountId(account(&t.store, "KASA", Decimal::ZERO).await.kasa_id);

    let plain = t
        .store
        .income()
        .add_single_year(&ctx, income_input(kasa, date(2025, 5, 5), dec!(10)))
        .await
        .unwrap();
    assert_eq!(plain.ait_oldugu_yil, 2025);
    assert_eq!(plain.tahakkuk_durumu, AccrualStatus::Normal.as_str());
    assert_eq!(plain.gelir_turu, "KİRA");

    let prepaid = t
        .store
        .income()
        .add_single_year(
            &ctx,
            NewIncomeInput {
                belongs_to_year: Some(2026),
                ..income_input(kasa, date(2025, 5, 5), dec!(40))
            },
        )
        .await
        .unwrap();
    assert_eq!(prepaid.tahakkuk_durumu, AccrualStatus::Prepaid.as_str());

    let forced = t
        .store
        .income()
        .add_single_year(
            &ctx,
            NewIncomeInput {
                accrual_status: Some(AccrualStatus::Retroactive),
                ..income_input(kasa, date(2025, 5, 5), dec!(10))
            },
        )
        .await
        .unwrap();
    assert_eq!(forced.tahakkuk_durumu, AccrualStatus::Retroactive.as_str());

    let listed = t
        .store
        .income()
        .list(LedgerFilter {
            belongs_to_year: Some(2026),
            ..LedgerFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].gelir_id, prepaid.gelir_id);
}

#[tokio::test]
async fn test_deleting_prepaid_income_reverses_accrual() {
    let t = open().await;
    let ctx = admin();
    let kasa = CashAccountId(account(&t.store, "KASA", Decimal::ZERO).await.kasa_id);

    let prepaid = t
        .store
        .income()
        .add_single_year(
            &ctx,
            NewIncomeInput {
                belongs_to_year: Some(2027),
                ..income_input(kasa, date(2025, 5, 5), dec!(40))
            },
        )
        .await
        .unwrap();

    let free = t.store.cash_accounts().free_balance(kasa, date(2025, 12, 31)).await.unwrap();
    assert_eq!(free.accrued_income, dec!(40));
    assert_eq!(free.free, Decimal::ZERO);

    t.store.income().delete(&ctx, IncomeId(prepaid.gelir_id)).await.unwrap();
    let accruals = t
        .store
        .accruals()
        .for_source(AccrualKind::Income, prepaid.gelir_id)
        .await
        .unwrap();
    assert_eq!(accruals.len(), 1);
    assert_eq!(accruals[0].state, AccrualState::Reversed);

    let free = t.store.cash_accounts().free_balance(kasa, date(2025, 12, 31)).await.unwrap();
    assert_eq!(free.physical, Decimal::ZERO);
    assert_eq!(free.accrued_income, Decimal::ZERO);

    let err = t.store.income().delete(&ctx, IncomeId(prepaid.gelir_id)).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_ledger_validation() {
    let t = open().await;
    let ctx = admin();
    let kasa = CashAccountId(account(&t.store, "KASA", Decimal::ZERO).await.kasa_id);

    let err = t
        .store
        .income()
        .add_single_year(&ctx, income_input(kasa, date(2025, 1, 1), dec!(-1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));

    let err = t
        .store
        .income()
        .add_single_year(&ctx, income_input(CashAccountId(77), date(2025, 1, 1), dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    let err = t
        .store
        .expenses()
        .add_single_year(&ctx, expense_input(kasa, date(2025, 1, 1), Decimal::ZERO))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));

    let err = t
        .store
        .income()
        .add_single_year(&viewer(), income_input(kasa, date(2025, 1, 1), dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Forbidden));
}

#[tokio::test]
async fn test_transfer_rules() {
    let t = open().await;
    let ctx = admin();
    let kasa = CashAccountId(account(&t.store, "KASA", dec!(100)).await.kasa_id);
    let banka = CashAccountId(account(&t.store, "BANKA", Decimal::ZERO).await.kasa_id);
    let transfer = |from, to, amount| NewTransferInput {
        date: date(2025, 1, 1),
        from,
        to,
        amount,
        description: String::new(),
    };

    let err = t.store.transfers().add(&ctx, transfer(kasa, kasa, dec!(10))).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));
    let err = t
        .store
        .transfers()
        .add(&ctx, transfer(kasa, banka, Decimal::ZERO))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));
    let err = t
        .store
        .transfers()
        .add(&ctx, transfer(kasa, CashAccountId(99), dec!(10)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));

    let made = t.store.transfers().add(&ctx, transfer(kasa, banka, dec!(60))).await.unwrap();
    assert_eq!(t.store.transfers().list(Some(banka)).await.unwrap().len(), 1);
    assert_eq!(t.store.cash_accounts().balance(banka, None).await.unwrap().transfers_in, dec!(60));

    t.store
        .transfers()
        .delete(&ctx, dernek_shared::types::TransferId(made.virman_id))
        .await
        .unwrap();
    assert!(t.store.transfers().list(None).await.unwrap().is_empty());
    assert_eq!(t.store.cash_accounts().balance(kasa, None).await.unwrap().net, dec!(100));
}

#[tokio::test]
async fn test_account_lifecycle() {
    let t = open().await;
    let ctx = admin();
    let repo = t.store.cash_accounts();

    let created = account(&t.store, "KASA", dec!(10)).await;
    assert_eq!(created.serbest_devir_bakiye, dec!(10));
    assert!(created.aktif);

    let err = repo
        .create(
            &ctx,
            CreateAccountInput {
                name: " KASA ".to_string(),
                currency: Currency::Usd,
                opening_balance: Decimal::ZERO,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conflict));

    let err = repo
        .create(
            &ctx,
            CreateAccountInput {
                name: "   ".to_string(),
                currency: Currency::Eur,
                opening_balance: Decimal::ZERO,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));

    let id = CashAccountId(created.kasa_id);
    repo.deactivate(&ctx, id).await.unwrap();
    assert!(repo.list_active().await.unwrap().is_empty());
    assert!(repo.find_by_name("KASA").await.unwrap().is_some());

    let err = t
        .store
        .income()
        .add_single_year(&ctx, income_input(id, date(2025, 1, 1), dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Validation));
}

#[tokio::test]
async fn test_replication_queues_committed_mutations() {
    let mut config = memory_config();
    config.store.replicate = true;
    let t = open_with(config).await;
    let ctx = admin();

    let kasa = CashAccountId(account(&t.store, "KASA", Decimal::ZERO).await.kasa_id);
    t.store
        .income()
        .add_single_year(&ctx, income_input(kasa, date(2025, 1, 1), dec!(5)))
        .await
        .unwrap();
    t.store
        .income()
        .add_single_year(&ctx, income_input(kasa, date(2025, 1, 1), dec!(-5)))
        .await
        .unwrap_err();

    let pending = t.store.pending_sync();
    let tables: Vec<&str> = pending.iter().map(|op| op.table.as_str()).collect();
    assert_eq!(tables, vec!["kasalar", "gelirler"]);
    assert!(pending.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert_eq!(t.audit.entries().len(), 2);
    assert!(t.store.pending_sync().is_empty());

    let plain = open().await;
    assert!(plain.store.pending_sync().is_empty());
}
