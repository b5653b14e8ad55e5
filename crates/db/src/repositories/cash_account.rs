//! Cash account repository: accounts and their balances.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use dernek_core::accrual::{summarize, totals_by_kind, AccrualEntry, AccrualKind};
use dernek_core::audit::{AuditJournal, AuditOperation, AuditSink};
use dernek_core::auth::{ActorContext, Permission};
use dernek_core::ledger::{
    balance_window, ensure_open, CashBalance, DateWindow, FreeBalance, LedgerError,
    MovementTotals,
};
use dernek_shared::types::{CashAccountId, Currency};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};

use super::{accrual, snapshot};
use crate::entities::{gelirler, giderler, kasalar, virmanlar};
use crate::error::StoreError;

const TABLE: &str = "kasalar";

/// Input for creating a cash account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Unique display name.
    pub name: String,
    /// Currency tag.
    pub currency: Currency,
    /// Opening balance.
    pub opening_balance: Decimal,
}

/// Cash account repository.
#[derive(Debug, Clone)]
pub struct CashAccountRepository {
    db: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
}

impl CashAccountRepository {
    /// Creates a new cash account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, audit: Arc<dyn AuditSink>) -> Self {
        Self { db, audit }
    }

    /// Creates an active cash account.
    ///
    /// The opening balance is also the free opening balance.
    pub async fn create(
        &self,
        ctx: &ActorContext,
        input: CreateAccountInput,
    ) -> Result<kasalar::Model, StoreError> {
        ctx.require(Permission::OperateCashAccount)?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(LedgerError::EmptyAccountName.into());
        }

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let existing = kasalar::Entity::find()
            .filter(kasalar::Column::KasaAdi.eq(&name))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateAccountName(name).into());
        }

        let account = kasalar::ActiveModel {
            kasa_adi: Set(name),
            para_birimi: Set(input.currency.as_str().to_string()),
            devir_bakiye: Set(input.opening_balance),
            serbest_devir_bakiye: Set(input.opening_balance),
            tahakkuk_toplami: Set(Decimal::ZERO),
            son_devir_tarihi: Set(None),
            aktif: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        journal.push_change(
            AuditOperation::Create,
            TABLE,
            account.kasa_id,
            format!("cash account {}", account.kasa_adi),
            None,
            snapshot(&account),
        );

        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(
            account_id = account.kasa_id,
            name = %account.kasa_adi,
            "cash account created"
        );
        Ok(account)
    }

    /// Deactivates an account. Accounts are never deleted.
    pub async fn deactivate(
        &self,
        ctx: &ActorContext,
        id: CashAccountId,
    ) -> Result<kasalar::Model, StoreError> {
        ctx.require(Permission::OperateCashAccount)?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let account = load_account(&txn, id).await?;
        let mut active: kasalar::ActiveModel = account.into();
        active.aktif = Set(false);
        let account = active.update(&txn).await?;

        journal.push_change(
            AuditOperation::Update,
            TABLE,
            account.kasa_id,
            "cash account deactivated",
            Some("aktif=1".to_string()),
            Some("aktif=0".to_string()),
        );

        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(account_id = account.kasa_id, "cash account deactivated");
        Ok(account)
    }

    /// Finds an account by id.
    pub async fn find(&self, id: CashAccountId) -> Result<Option<kasalar::Model>, StoreError> {
        Ok(kasalar::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?)
    }

    /// Finds an account by display name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<kasalar::Model>, StoreError> {
        Ok(kasalar::Entity::find()
            .filter(kasalar::Column::KasaAdi.eq(name.trim()))
            .one(&self.db)
            .await?)
    }

    /// Lists active accounts by name.
    pub async fn list_active(&self) -> Result<Vec<kasalar::Model>, StoreError> {
        Ok(active_accounts(&self.db).await?)
    }

    /// Physical balance as of `as_of` (no upper bound when `None`).
    pub async fn balance(
        &self,
        id: CashAccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<CashBalance, StoreError> {
        let account = load_account(&self.db, id).await?;
        compute_balance(&self.db, &account, as_of).await
    }

    /// Physical and free balance as of `as_of`, with accruals per later year.
    pub async fn free_balance(
        &self,
        id: CashAccountId,
        as_of: NaiveDate,
    ) -> Result<FreeBalance, StoreError> {
        let account = load_account(&self.db, id).await?;
        compute_free_balance(&self.db, &account, as_of).await
    }
}

/// Loads an account or fails with `AccountNotFound`.
pub(crate) async fn load_account<C: ConnectionTrait>(
    conn: &C,
    id: CashAccountId,
) -> Result<kasalar::Model, StoreError> {
    kasalar::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(id).into())
}

/// Loads an account that may receive new records.
pub(crate) async fn load_active_account<C: ConnectionTrait>(
    conn: &C,
    id: CashAccountId,
) -> Result<kasalar::Model, StoreError> {
    let account = load_account(conn, id).await?;
    if account.aktif {
        Ok(account)
    } else {
        Err(LedgerError::AccountInactive(id).into())
    }
}

/// Fails with `PeriodClosed` when `date` is already folded into the opening
/// balance of account `id`.
pub(crate) async fn ensure_period_open<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    date: NaiveDate,
) -> Result<(), StoreError> {
    let id = CashAccountId(id);
    let account = load_account(conn, id).await?;
    Ok(ensure_open(id, account.son_devir_tarihi, date)?)
}

pub(crate) async fn active_accounts<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<kasalar::Model>, sea_orm::DbErr> {
    kasalar::Entity::find()
        .filter(kasalar::Column::Aktif.eq(true))
        .order_by_asc(kasalar::Column::KasaAdi)
        .all(conn)
        .await
}

pub(crate) fn currency_of(account: &kasalar::Model) -> Result<Currency, StoreError> {
    account
        .para_birimi
        .parse()
        .map_err(|e: String| StoreError::corrupt(TABLE, e))
}

fn within<E, C>(select: Select<E>, column: C, window: DateWindow) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let select = match window.after {
        Some(after) => select.filter(column.gt(after)),
        None => select,
    };
    match window.until {
        Some(until) => select.filter(column.lte(until)),
        None => select,
    }
}

async fn sum_amounts<E, C>(
    conn: &C,
    select: Select<E>,
    amount: E::Column,
) -> Result<Decimal, StoreError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let amounts: Vec<Decimal> = select
        .select_only()
        .column(amount)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(amounts.into_iter().sum())
}

/// Computes the physical balance of `account`.
pub(crate) async fn compute_balance<C: ConnectionTrait>(
    conn: &C,
    account: &kasalar::Model,
    as_of: Option<NaiveDate>,
) -> Result<CashBalance, StoreError> {
    let window = balance_window(account.son_devir_tarihi, as_of)?;
    let id = account.kasa_id;

    let income = sum_amounts(
        conn,
        within(
            gelirler::Entity::find().filter(gelirler::Column::KasaId.eq(id)),
            gelirler::Column::Tarih,
            window,
        ),
        gelirler::Column::Tutar,
    )
    .await?;
    let expense = sum_amounts(
        conn,
        within(
            giderler::Entity::find().filter(giderler::Column::KasaId.eq(id)),
            giderler::Column::Tarih,
            window,
        ),
        giderler::Column::Tutar,
    )
    .await?;
    let transfers_in = sum_amounts(
        conn,
        within(
            virmanlar::Entity::find().filter(virmanlar::Column::HedefKasaId.eq(id)),
            virmanlar::Column::Tarih,
            window,
        ),
        virmanlar::Column::Tutar,
    )
    .await?;
    let transfers_out = sum_amounts(
        conn,
        within(
            virmanlar::Entity::find().filter(virmanlar::Column::KaynakKasaId.eq(id)),
            virmanlar::Column::Tarih,
            window,
        ),
        virmanlar::Column::Tutar,
    )
    .await?;

    Ok(CashBalance::from_totals(
        currency_of(account)?,
        account.devir_bakiye,
        MovementTotals {
            income,
            expense,
            transfers_in,
            transfers_out,
        },
    ))
}

/// Income and expense ids booked on a set of accounts.
#[derive(Debug)]
pub(crate) struct AccountSources {
    incomes: HashSet<i32>,
    expenses: HashSet<i32>,
}

impl AccountSources {
    /// Records of `account_ids`, limited to those dated on or before `until`.
    pub(crate) async fn load<C: ConnectionTrait>(
        conn: &C,
        account_ids: &[i32],
        until: Option<NaiveDate>,
    ) -> Result<Self, StoreError> {
        let mut incomes = gelirler::Entity::find()
            .select_only()
            .column(gelirler::Column::GelirId)
            .filter(gelirler::Column::KasaId.is_in(account_ids.iter().copied()));
        let mut expenses = giderler::Entity::find()
            .select_only()
            .column(giderler::Column::GiderId)
            .filter(giderler::Column::KasaId.is_in(account_ids.iter().copied()));
        if let Some(until) = until {
            incomes = incomes.filter(gelirler::Column::Tarih.lte(until));
            expenses = expenses.filter(giderler::Column::Tarih.lte(until));
        }

        Ok(Self {
            incomes: incomes.into_tuple::<i32>().all(conn).await?.into_iter().collect(),
            expenses: expenses.into_tuple::<i32>().all(conn).await?.into_iter().collect(),
        })
    }

    /// True if the accrual's source record is one of these.
    pub(crate) fn contains(&self, entry: &AccrualEntry) -> bool {
        match entry.kind {
            AccrualKind::Income => self.incomes.contains(&entry.source_id),
            AccrualKind::Expense => self.expenses.contains(&entry.source_id),
        }
    }
}

/// Active accruals whose source record sits in `account` and is dated on or
/// before `as_of`.
pub(crate) async fn account_accruals<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    as_of: NaiveDate,
) -> Result<Vec<AccrualEntry>, StoreError> {
    let sources = AccountSources::load(conn, &[account_id], Some(as_of)).await?;
    Ok(accrual::active_entries(conn)
        .await?
        .into_iter()
        .filter(|entry| sources.contains(entry))
        .collect())
}

/// Computes the physical/free split of `account`.
pub(crate) async fn compute_free_balance<C: ConnectionTrait>(
    conn: &C,
    account: &kasalar::Model,
    as_of: NaiveDate,
) -> Result<FreeBalance, StoreError> {
    let physical = compute_balance(conn, account, Some(as_of)).await?.net;
    let entries = account_accruals(conn, account.kasa_id, as_of).await?;
    let totals = totals_by_kind(&entries, as_of);

    Ok(FreeBalance::new(
        physical,
        totals.income,
        totals.expense,
        summarize(&entries, as_of),
    ))
}

/// Writes the closing figures into the account row.
pub(crate) async fn apply_closure<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    physical: Decimal,
    free: Decimal,
    accrued: Decimal,
    closed_on: NaiveDate,
) -> Result<(), StoreError> {
    kasalar::Entity::update_many()
        .col_expr(kasalar::Column::DevirBakiye, Expr::value(physical))
        .col_expr(kasalar::Column::SerbestDevirBakiye, Expr::value(free))
        .col_expr(kasalar::Column::TahakkukToplami, Expr::value(accrued))
        .col_expr(kasalar::Column::SonDevirTarihi, Expr::value(closed_on))
        .filter(kasalar::Column::KasaId.eq(account_id))
        .exec(conn)
        .await?;
    Ok(())
}
