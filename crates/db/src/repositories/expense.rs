//! Expense ledger repository.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use dernek_core::accrual::{AccrualKind, NewAccrual};
use dernek_core::audit::{AuditJournal, AuditOperation, AuditSink};
use dernek_core::auth::{ActorContext, Permission};
use dernek_core::ledger::{
    next_document_number, plan_multi_year, AccrualStatus, BatchId, LedgerError, LedgerKind,
    MultiYearRequest,
};
use dernek_shared::types::{CashAccountId, ExpenseId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::cash_account::{ensure_period_open, load_active_account};
use super::{accrual, snapshot, LedgerFilter};
use crate::entities::giderler;
use crate::error::StoreError;

const TABLE: &str = "giderler";

/// Input for a single-year expense.
#[derive(Debug, Clone)]
pub struct NewExpenseInput {
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-text category.
    pub category: String,
    /// Free-text description.
    pub description: String,
    /// Amount; must be positive.
    pub amount: Decimal,
    /// Paying cash account.
    pub account_id: CashAccountId,
    /// Fiscal year; defaults to the year of `date`.
    pub belongs_to_year: Option<i32>,
    /// Accrual tag; defaults to the classification of `belongs_to_year`.
    pub accrual_status: Option<AccrualStatus>,
}

/// Input for an expense paid for several years at once.
#[derive(Debug, Clone)]
pub struct MultiYearExpenseInput {
    /// Free-text category.
    pub category: String,
    /// Paying cash account.
    pub account_id: CashAccountId,
    /// Years, amount, payment date and description.
    pub request: MultiYearRequest,
}

struct ExpenseRow {
    date: NaiveDate,
    category: String,
    description: String,
    amount: Decimal,
    account_id: i32,
    belongs_to_year: i32,
    status: AccrualStatus,
    batch_id: Option<String>,
}

/// Expense ledger repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, audit: Arc<dyn AuditSink>) -> Self {
        Self { db, audit }
    }

    /// Records one expense with the next document number.
    pub async fn add_single_year(
        &self,
        ctx: &ActorContext,
        input: NewExpenseInput,
    ) -> Result<giderler::Model, StoreError> {
        ctx.require(Permission::CreateExpense)?;
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(input.amount).into());
        }

        let belongs_to_year = input.belongs_to_year.unwrap_or_else(|| input.date.year());
        let status = input
            .accrual_status
            .unwrap_or_else(|| AccrualStatus::classify(belongs_to_year, input.date.year()));

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let account = load_active_account(&txn, input.account_id).await?;
        let expense = insert_expense_in(
            &txn,
            &mut journal,
            ExpenseRow {
                date: input.date,
                category: input.category,
                description: input.description,
                amount: input.amount,
                account_id: account.kasa_id,
                belongs_to_year,
                status,
                batch_id: None,
            },
        )
        .await?;

        txn.commit().await?;
        journal.flush(self.audit.as_ref());
        Ok(expense)
    }

    /// Records one expense per year of the request under a shared batch id.
    pub async fn add_multi_year(
        &self,
        ctx: &ActorContext,
        input: MultiYearExpenseInput,
    ) -> Result<(BatchId, Vec<giderler::Model>), StoreError> {
        ctx.require(Permission::CreateExpense)?;
        let plan = plan_multi_year(&input.request)?;
        let collection_year = input.request.collection_year();

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let account = load_active_account(&txn, input.account_id).await?;
        let existing: Vec<Option<String>> = giderler::Entity::find()
            .select_only()
            .column(giderler::Column::CokluOdemeGrupId)
            .filter(
                giderler::Column::CokluOdemeGrupId
                    .starts_with(BatchId::year_prefix(collection_year)),
            )
            .into_tuple()
            .all(&txn)
            .await?;
        let batch_id =
            BatchId::next(collection_year, existing.iter().flatten().map(String::as_str))?;

        let mut records = Vec::with_capacity(plan.len());
        for entry in plan {
            let expense = insert_expense_in(
                &txn,
                &mut journal,
                ExpenseRow {
                    date: input.request.collection_date,
                    category: input.category.clone(),
                    description: entry.description,
                    amount: entry.amount,
                    account_id: account.kasa_id,
                    belongs_to_year: entry.year,
                    status: entry.status,
                    batch_id: Some(batch_id.to_string()),
                },
            )
            .await?;
            records.push(expense);
        }

        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(
            batch_id = %batch_id,
            records = records.len(),
            "multi-year expense recorded"
        );
        Ok((batch_id, records))
    }

    /// Deletes an expense and reverses its accruals.
    pub async fn delete(&self, ctx: &ActorContext, id: ExpenseId) -> Result<(), StoreError> {
        ctx.require(Permission::DeleteExpense)?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let expense = giderler::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::ExpenseNotFound(id))?;
        ensure_period_open(&txn, expense.kasa_id, expense.tarih).await?;
        accrual::reverse_in(&txn, &mut journal, AccrualKind::Expense, expense.gider_id).await?;
        giderler::Entity::delete_by_id(expense.gider_id)
            .exec(&txn)
            .await?;
        journal.push_change(
            AuditOperation::Delete,
            TABLE,
            expense.gider_id,
            format!("{} deleted", expense.islem_no),
            snapshot(&expense),
            None,
        );

        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::debug!(expense_id = expense.gider_id, "expense deleted");
        Ok(())
    }

    /// Finds an expense by id.
    pub async fn find(&self, id: ExpenseId) -> Result<Option<giderler::Model>, StoreError> {
        Ok(giderler::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?)
    }

    /// Lists expenses ordered by date.
    pub async fn list(&self, filter: LedgerFilter) -> Result<Vec<giderler::Model>, StoreError> {
        let mut query = giderler::Entity::find();
        if let Some(account_id) = filter.account_id {
            query = query.filter(giderler::Column::KasaId.eq(account_id.into_inner()));
        }
        if let Some(from) = filter.from {
            query = query.filter(giderler::Column::Tarih.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(giderler::Column::Tarih.lte(to));
        }
        if let Some(year) = filter.belongs_to_year {
            query = query.filter(giderler::Column::AitOlduguYil.eq(year));
        }
        if let Some(batch_id) = filter.batch_id {
            query = query.filter(giderler::Column::CokluOdemeGrupId.eq(batch_id.to_string()));
        }

        Ok(query
            .order_by_asc(giderler::Column::Tarih)
            .order_by_asc(giderler::Column::GiderId)
            .all(&self.db)
            .await?)
    }
}

async fn insert_expense_in<C: ConnectionTrait>(
    conn: &C,
    journal: &mut AuditJournal,
    row: ExpenseRow,
) -> Result<giderler::Model, StoreError> {
    ensure_period_open(conn, row.account_id, row.date).await?;

    let prefix = LedgerKind::Expense.document_prefix();
    let numbers: Vec<String> = giderler::Entity::find()
        .select_only()
        .column(giderler::Column::IslemNo)
        .filter(giderler::Column::IslemNo.starts_with(prefix))
        .into_tuple()
        .all(conn)
        .await?;
    let document_number =
        next_document_number(LedgerKind::Expense, numbers.iter().map(String::as_str))?;

    let collection_year = row.date.year();
    let expense = giderler::ActiveModel {
        tarih: Set(row.date),
        islem_no: Set(document_number),
        gider_turu: Set(row.category),
        aciklama: Set(row.description),
        tutar: Set(row.amount),
        kasa_id: Set(row.account_id),
        ait_oldugu_yil: Set(row.belongs_to_year),
        tahakkuk_durumu: Set(row.status.as_str().to_string()),
        coklu_odeme_grup_id: Set(row.batch_id),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    journal.push_change(
        AuditOperation::Create,
        TABLE,
        expense.gider_id,
        format!("{} {} {}", expense.islem_no, expense.gider_turu, expense.tutar),
        None,
        snapshot(&expense),
    );

    if row.status == AccrualStatus::Prepaid {
        accrual::register_in(
            conn,
            journal,
            NewAccrual {
                kind: AccrualKind::Expense,
                source_id: expense.gider_id,
                collection_year,
                belongs_to_year: expense.ait_oldugu_yil,
                amount: expense.tutar,
            },
        )
        .await?;
    }

    tracing::debug!(
        expense_id = expense.gider_id,
        document = %expense.islem_no,
        year = expense.ait_oldugu_yil,
        "expense recorded"
    );
    Ok(expense)
}
