//! Accrual registry repository.

use std::sync::Arc;

use chrono::NaiveDate;
use dernek_core::accrual::{
    consumable, summarize, AccrualEntry, AccrualKind, AccrualState,
    AccrualYearSummary, NewAccrual,
};
use dernek_core::audit::{AuditJournal, AuditOperation, AuditSink};
use dernek_core::auth::{ActorContext, Permission};
use dernek_core::ledger::LedgerError;
use dernek_shared::types::{AccrualId, CashAccountId, ExpenseId, IncomeId};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::cash_account::{account_accruals, load_account, AccountSources};
use crate::entities::{gelirler, giderler, tahakkuklar};
use crate::error::StoreError;

const TABLE: &str = "tahakkuklar";

/// Accrual registry repository.
#[derive(Debug, Clone)]
pub struct AccrualRepository {
    db: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
}

impl AccrualRepository {
    /// Creates a new accrual repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, audit: Arc<dyn AuditSink>) -> Self {
        Self { db, audit }
    }

    /// Registers an accrual for an existing source record.
    ///
    /// The ledgers call this automatically for prepaid records; the public
    /// entry point exists for corrections.
    pub async fn register(
        &self,
        ctx: &ActorContext,
        accrual: NewAccrual,
    ) -> Result<AccrualEntry, StoreError> {
        ctx.require(match accrual.kind {
            AccrualKind::Income => Permission::CreateIncome,
            AccrualKind::Expense => Permission::CreateExpense,
        })?;
        accrual.validate()?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let source_exists = match accrual.kind {
            AccrualKind::Income => gelirler::Entity::find_by_id(accrual.source_id)
                .one(&txn)
                .await?
                .is_some(),
            AccrualKind::Expense => giderler::Entity::find_by_id(accrual.source_id)
                .one(&txn)
                .await?
                .is_some(),
        };
        if !source_exists {
            return Err(match accrual.kind {
                AccrualKind::Income => LedgerError::IncomeNotFound(IncomeId(accrual.source_id)),
                AccrualKind::Expense => LedgerError::ExpenseNotFound(ExpenseId(accrual.source_id)),
            }
            .into());
        }

        let entry = register_in(&txn, &mut journal, accrual).await?;

        txn.commit().await?;
        journal.flush(self.audit.as_ref());
        Ok(entry)
    }

    /// Reverses every active accrual of a source record. Returns the count.
    pub async fn reverse(
        &self,
        ctx: &ActorContext,
        kind: AccrualKind,
        source_id: i32,
    ) -> Result<u64, StoreError> {
        ctx.require(match kind {
            AccrualKind::Income => Permission::DeleteIncome,
            AccrualKind::Expense => Permission::DeleteExpense,
        })?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);
        let reversed = reverse_in(&txn, &mut journal, kind, source_id).await?;
        txn.commit().await?;
        journal.flush(self.audit.as_ref());
        Ok(reversed)
    }

    /// Active accruals belonging to a year after `as_of`, grouped by year.
    ///
    /// With `account` set, only accruals whose source record sits in that
    /// account and is dated on or before `as_of` are counted.
    pub async fn summary(
        &self,
        as_of: NaiveDate,
        account: Option<CashAccountId>,
    ) -> Result<Vec<AccrualYearSummary>, StoreError> {
        let entries = match account {
            Some(id) => {
                let account = load_account(&self.db, id).await?;
                account_accruals(&self.db, account.kasa_id, as_of).await?
            }
            None => active_entries(&self.db).await?,
        };
        Ok(summarize(&entries, as_of))
    }

    /// Every accrual of a source record, in any state.
    pub async fn for_source(
        &self,
        kind: AccrualKind,
        source_id: i32,
    ) -> Result<Vec<AccrualEntry>, StoreError> {
        tahakkuklar::Entity::find()
            .filter(tahakkuklar::Column::KaynakTablo.eq(kind.source_table()))
            .filter(tahakkuklar::Column::KaynakId.eq(source_id))
            .order_by_asc(tahakkuklar::Column::TahakkukId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_entry)
            .collect()
    }
}

pub(crate) fn to_entry(model: tahakkuklar::Model) -> Result<AccrualEntry, StoreError> {
    let kind = model
        .tahakkuk_turu
        .parse::<AccrualKind>()
        .map_err(|e| StoreError::corrupt(TABLE, e.to_string()))?;
    let state = model
        .durum
        .parse::<AccrualState>()
        .map_err(|e| StoreError::corrupt(TABLE, e.to_string()))?;
    Ok(AccrualEntry {
        id: AccrualId(model.tahakkuk_id),
        kind,
        source_id: model.kaynak_id,
        collection_year: model.tahsil_yili,
        belongs_to_year: model.ait_oldugu_yil,
        amount: model.tutar,
        state,
    })
}

/// Every active accrual in the store.
pub(crate) async fn active_entries<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<AccrualEntry>, StoreError> {
    tahakkuklar::Entity::find()
        .filter(tahakkuklar::Column::Durum.eq(AccrualState::Active.as_str()))
        .order_by_asc(tahakkuklar::Column::AitOlduguYil)
        .all(conn)
        .await?
        .into_iter()
        .map(to_entry)
        .collect()
}

/// Inserts a validated accrual.
pub(crate) async fn register_in<C: ConnectionTrait>(
    conn: &C,
    journal: &mut AuditJournal,
    accrual: NewAccrual,
) -> Result<AccrualEntry, StoreError> {
    accrual.validate()?;

    let model = tahakkuklar::ActiveModel {
        tahakkuk_turu: Set(accrual.kind.as_str().to_string()),
        kaynak_tablo: Set(accrual.kind.source_table().to_string()),
        kaynak_id: Set(accrual.source_id),
        tahsil_yili: Set(accrual.collection_year),
        ait_oldugu_yil: Set(accrual.belongs_to_year),
        tutar: Set(accrual.amount),
        durum: Set(AccrualState::Active.as_str().to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    journal.push(
        AuditOperation::Automatic,
        TABLE,
        model.tahakkuk_id,
        format!(
            "{} accrual of {} for {} from {} #{}",
            accrual.kind.as_str(),
            accrual.amount,
            accrual.belongs_to_year,
            accrual.kind.source_table(),
            accrual.source_id
        ),
    );
    tracing::debug!(
        accrual_id = model.tahakkuk_id,
        source_id = accrual.source_id,
        year = accrual.belongs_to_year,
        "accrual registered"
    );

    to_entry(model)
}

/// Marks the active accruals of a source record reversed.
pub(crate) async fn reverse_in<C: ConnectionTrait>(
    conn: &C,
    journal: &mut AuditJournal,
    kind: AccrualKind,
    source_id: i32,
) -> Result<u64, StoreError> {
    let result = tahakkuklar::Entity::update_many()
        .col_expr(
            tahakkuklar::Column::Durum,
            Expr::value(AccrualState::Reversed.as_str()),
        )
        .filter(tahakkuklar::Column::KaynakTablo.eq(kind.source_table()))
        .filter(tahakkuklar::Column::KaynakId.eq(source_id))
        .filter(tahakkuklar::Column::Durum.eq(AccrualState::Active.as_str()))
        .exec(conn)
        .await?;

    if result.rows_affected > 0 {
        journal.push(
            AuditOperation::Automatic,
            TABLE,
            source_id,
            format!(
                "{} accrual(s) of {} #{source_id} reversed",
                result.rows_affected,
                kind.source_table()
            ),
        );
    }
    Ok(result.rows_affected)
}

/// Marks the active accruals of `account_ids` realised by closing `year`
/// consumed. Accruals booked on other accounts stay active.
pub(crate) async fn consume_in<C: ConnectionTrait>(
    conn: &C,
    journal: &mut AuditJournal,
    year: i32,
    account_ids: &[i32],
) -> Result<usize, StoreError> {
    let sources = AccountSources::load(conn, account_ids, None).await?;
    let entries: Vec<AccrualEntry> = active_entries(conn)
        .await?
        .into_iter()
        .filter(|entry| sources.contains(entry))
        .collect();
    let ids: Vec<i32> = consumable(&entries, year)
        .into_iter()
        .map(AccrualId::into_inner)
        .collect();
    if ids.is_empty() {
        return Ok(0);
    }

    tahakkuklar::Entity::update_many()
        .col_expr(
            tahakkuklar::Column::Durum,
            Expr::value(AccrualState::Consumed.as_str()),
        )
        .filter(tahakkuklar::Column::TahakkukId.is_in(ids.iter().copied()))
        .exec(conn)
        .await?;

    journal.push(
        AuditOperation::Closure,
        TABLE,
        0,
        format!("{} accrual(s) realised by closing {year}", ids.len()),
    );
    Ok(ids.len())
}
