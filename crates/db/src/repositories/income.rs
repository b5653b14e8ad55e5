//! Income ledger repository.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use dernek_core::accrual::{AccrualKind, NewAccrual};
use dernek_core::audit::{AuditJournal, AuditOperation, AuditSink};
use dernek_core::auth::{ActorContext, Permission};
use dernek_core::dues::DuesError;
use dernek_core::ledger::{
    next_document_number, plan_multi_year, AccrualStatus, BatchId, IncomeCategory, LedgerError,
    LedgerKind, MultiYearRequest,
};
use dernek_shared::config::DuesSettings;
use dernek_shared::types::{CashAccountId, DuesRecordId, IncomeId, MemberId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::cash_account::{ensure_period_open, load_active_account};
use super::{accrual, dues, snapshot, LedgerFilter};
use crate::entities::{aidat_takip, gelirler};
use crate::error::StoreError;
use crate::members::MemberDirectory;

const TABLE: &str = "gelirler";

/// Input for a single-year income.
#[derive(Debug, Clone)]
pub struct NewIncomeInput {
    /// Transaction date.
    pub date: NaiveDate,
    /// Category.
    pub category: IncomeCategory,
    /// Free-text description.
    pub description: String,
    /// Amount; must be positive.
    pub amount: Decimal,
    /// Receiving cash account.
    pub account_id: CashAccountId,
    /// Fiscal year; defaults to the year of `date`.
    pub belongs_to_year: Option<i32>,
    /// Accrual tag; defaults to the classification of `belongs_to_year`.
    pub accrual_status: Option<AccrualStatus>,
}

/// Input for a multi-year income collection.
#[derive(Debug, Clone)]
pub struct MultiYearIncomeInput {
    /// Paying member; links each year into the dues tracker for dues income.
    pub member_id: Option<MemberId>,
    /// Category.
    pub category: IncomeCategory,
    /// Receiving cash account.
    pub account_id: CashAccountId,
    /// Years, amount, collection date and description.
    pub request: MultiYearRequest,
}

/// Result of a multi-year collection.
#[derive(Debug, Clone)]
pub struct MultiYearIncome {
    /// Batch id shared by the records.
    pub batch_id: BatchId,
    /// Created records, ascending by year.
    pub records: Vec<gelirler::Model>,
}

/// Row to insert into `gelirler`.
#[derive(Debug, Clone)]
pub(crate) struct IncomeRow {
    pub date: NaiveDate,
    pub category: IncomeCategory,
    pub description: String,
    pub amount: Decimal,
    pub account_id: i32,
    pub belongs_to_year: i32,
    pub status: AccrualStatus,
    pub batch_id: Option<String>,
    pub dues_id: Option<i32>,
}

/// Income ledger repository.
#[derive(Debug, Clone)]
pub struct IncomeRepository {
    db: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
    members: Arc<dyn MemberDirectory>,
    dues: DuesSettings,
}

impl IncomeRepository {
    /// Creates a new income repository.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        audit: Arc<dyn AuditSink>,
        members: Arc<dyn MemberDirectory>,
        dues: DuesSettings,
    ) -> Self {
        Self {
            db,
            audit,
            members,
            dues,
        }
    }

    /// Records one income with the next document number.
    pub async fn add_single_year(
        &self,
        ctx: &ActorContext,
        input: NewIncomeInput,
    ) -> Result<gelirler::Model, StoreError> {
        ctx.require(Permission::CreateIncome)?;
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
        let income = insert_income_in(
            &txn,
            &mut journal,
            IncomeRow {
                date: input.date,
                category: input.category,
                description: input.description,
                amount: input.amount,
                account_id: account.kasa_id,
                belongs_to_year,
                status,
                batch_id: None,
                dues_id: None,
            },
        )
        .await?;

        txn.commit().await?;
        journal.flush(self.audit.as_ref());
        Ok(income)
    }

    /// Records one income per year of the request, sharing a batch id.
    ///
    /// For dues income with a member, every year is also collected into the
    /// member's dues record and the year's row becomes its promoted income.
    /// Any failure rolls back the whole batch.
    pub async fn add_multi_year(
        &self,
        ctx: &ActorContext,
        input: MultiYearIncomeInput,
    ) -> Result<MultiYearIncome, StoreError> {
        ctx.require(Permission::CreateIncome)?;
        let plan = plan_multi_year(&input.request)?;

        let member = match input.member_id {
            Some(member_id) if input.category.is_dues() => {
                ctx.require(Permission::CollectDues)?;
                let member = self
                    .members
                    .get(member_id)
                    .await?
                    .ok_or(DuesError::MemberNotFound(member_id))?;
                Some(member)
            }
            _ => None,
        };

        let collection_date = input.request.collection_date;
        let collection_year = input.request.collection_year();

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let account = load_active_account(&txn, input.account_id).await?;
        let batch_id = next_batch_id(&txn, collection_year).await?;

        let mut records = Vec::with_capacity(plan.len());
        for entry in plan {
            let income = insert_income_in(
                &txn,
                &mut journal,
                IncomeRow {
                    date: collection_date,
                    category: input.category,
                    description: entry.description,
                    amount: entry.amount,
                    account_id: account.kasa_id,
                    belongs_to_year: entry.year,
                    status: entry.status,
                    batch_id: Some(batch_id.to_string()),
                    dues_id: None,
                },
            )
            .await?;

            let income = match &member {
                Some(member) => {
                    dues::collect_with_batch_income_in(
                        &txn,
                        &mut journal,
                        member,
                        &self.dues,
                        income,
                    )
                    .await?
                }
                None => income,
            };
            records.push(income);
        }

        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(
            batch_id = %batch_id,
            records = records.len(),
            linked = member.is_some(),
            "multi-year income recorded"
        );
        Ok(MultiYearIncome { batch_id, records })
    }

    /// Deletes an income record and reverses its accruals.
    ///
    /// Dues income is locked: the promoted income of a dues record
    /// disappears only when a payment removal demotes the record.
    pub async fn delete(&self, ctx: &ActorContext, id: IncomeId) -> Result<(), StoreError> {
        ctx.require(Permission::DeleteIncome)?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let income = load_income(&txn, id).await?;
        if let Some(dues_id) = income.aidat_id {
            let record = aidat_takip::Entity::find_by_id(dues_id).one(&txn).await?;
            if record.is_some_and(|r| r.gelir_id == Some(income.gelir_id)) {
                return Err(LedgerError::DuesIncomeLocked {
                    income_id: id,
                    dues_id: DuesRecordId(dues_id),
                }
                .into());
            }
        }
        if income
            .gelir_turu
            .parse::<IncomeCategory>()
            .is_ok_and(|category| category.is_dues())
        {
            return Err(LedgerError::DuesCategoryLocked(id).into());
        }

        delete_income_in(&txn, &mut journal, income).await?;

        txn.commit().await?;
        journal.flush(self.audit.as_ref());
        Ok(())
    }

    /// Finds an income by id.
    pub async fn find(&self, id: IncomeId) -> Result<Option<gelirler::Model>, StoreError> {
        Ok(gelirler::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?)
    }

    /// Lists incomes ordered by date.
    pub async fn list(&self, filter: LedgerFilter) -> Result<Vec<gelirler::Model>, StoreError> {
        let mut query = gelirler::Entity::find();
        if let Some(account_id) = filter.account_id {
            query = query.filter(gelirler::Column::KasaId.eq(account_id.into_inner()));
        }
        if let Some(from) = filter.from {
            query = query.filter(gelirler::Column::Tarih.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(gelirler::Column::Tarih.lte(to));
        }
        if let Some(year) = filter.belongs_to_year {
            query = query.filter(gelirler::Column::AitOlduguYil.eq(year));
        }
        if let Some(batch_id) = filter.batch_id {
            query = query.filter(gelirler::Column::CokluOdemeGrupId.eq(batch_id.to_string()));
        }

        Ok(query
            .order_by_asc(gelirler::Column::Tarih)
            .order_by_asc(gelirler::Column::GelirId)
            .all(&self.db)
            .await?)
    }
}

pub(crate) async fn load_income<C: ConnectionTrait>(
    conn: &C,
    id: IncomeId,
) -> Result<gelirler::Model, StoreError> {
    gelirler::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::IncomeNotFound(id).into())
}

async fn next_batch_id<C: ConnectionTrait>(conn: &C, year: i32) -> Result<BatchId, StoreError> {
    let existing: Vec<Option<String>> = gelirler::Entity::find()
        .select_only()
        .column(gelirler::Column::CokluOdemeGrupId)
        .filter(gelirler::Column::CokluOdemeGrupId.starts_with(BatchId::year_prefix(year)))
        .into_tuple()
        .all(conn)
        .await?;
    Ok(BatchId::next(year, existing.iter().flatten().map(String::as_str))?)
}

/// Inserts an income with the next document number and registers the
/// accrual of a prepaid row.
pub(crate) async fn insert_income_in<C: ConnectionTrait>(
    conn: &C,
    journal: &mut AuditJournal,
    row: IncomeRow,
) -> Result<gelirler::Model, StoreError> {
    ensure_period_open(conn, row.account_id, row.date).await?;

    let prefix = LedgerKind::Income.document_prefix();
    let numbers: Vec<String> = gelirler::Entity::find()
        .select_only()
        .column(gelirler::Column::BelgeNo)
        .filter(gelirler::Column::BelgeNo.starts_with(prefix))
        .into_tuple()
        .all(conn)
        .await?;
    let document_number =
        next_document_number(LedgerKind::Income, numbers.iter().map(String::as_str))?;

    let collection_year = row.date.year();
    let income = gelirler::ActiveModel {
        tarih: Set(row.date),
        belge_no: Set(document_number),
        gelir_turu: Set(row.category.as_str().to_string()),
        aciklama: Set(row.description),
        tutar: Set(row.amount),
        kasa_id: Set(row.account_id),
        aidat_id: Set(row.dues_id),
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
        income.gelir_id,
        format!("{} {} {}", income.belge_no, income.gelir_turu, income.tutar),
        None,
        snapshot(&income),
    );

    if row.status == AccrualStatus::Prepaid {
        accrual::register_in(
            conn,
            journal,
            NewAccrual {
                kind: AccrualKind::Income,
                source_id: income.gelir_id,
                collection_year,
                belongs_to_year: income.ait_oldugu_yil,
                amount: income.tutar,
            },
        )
        .await?;
    }

    tracing::debug!(
        income_id = income.gelir_id,
        document = %income.belge_no,
        year = income.ait_oldugu_yil,
        status = row.status.as_str(),
        "income recorded"
    );
    Ok(income)
}

/// Deletes an income and reverses its accruals. Callers handle dues links.
pub(crate) async fn delete_income_in<C: ConnectionTrait>(
    conn: &C,
    journal: &mut AuditJournal,
    income: gelirler::Model,
) -> Result<(), StoreError> {
    ensure_period_open(conn, income.kasa_id, income.tarih).await?;
    accrual::reverse_in(conn, journal, AccrualKind::Income, income.gelir_id).await?;
    gelirler::Entity::delete_by_id(income.gelir_id)
        .exec(conn)
        .await?;

    journal.push_change(
        AuditOperation::Delete,
        TABLE,
        income.gelir_id,
        format!("{} deleted", income.belge_no),
        snapshot(&income),
        None,
    );
    tracing::debug!(income_id = income.gelir_id, "income deleted");
    Ok(())
}
