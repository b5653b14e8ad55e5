//! Dues tracker repository.
//!
//! Every payment change recomputes the record from its full payment set and
//! then runs the promotion rule inside the same transaction: a record is
//! promoted to exactly one dues income if and only if it is complete.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use dernek_core::audit::{AuditJournal, AuditOperation, AuditSink};
use dernek_core::auth::{ActorContext, Permission};
use dernek_core::dues::{
    promotion_description, recompute, reconcile_action, resolve_annual_dues, verify_record,
    DuesError, DuesStatus, PaymentMethod, PromotionFlag, PromotionState, ReconcileAction,
    DEFAULT_PAYMENT_NOTE,
};
use dernek_core::ledger::{AccrualStatus, IncomeCategory, LedgerError};
use dernek_core::members::MemberProjection;
use dernek_shared::config::DuesSettings;
use dernek_shared::types::{CashAccountId, DuesPaymentId, DuesRecordId, IncomeId, MemberId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use super::income::{delete_income_in, insert_income_in, IncomeRow};
use super::snapshot;
use crate::entities::{aidat_odemeleri, aidat_takip, gelirler, kasalar};
use crate::error::StoreError;
use crate::members::MemberDirectory;

const TABLE: &str = "aidat_takip";
const PAYMENTS: &str = "aidat_odemeleri";

/// Input for recording a dues payment.
#[derive(Debug, Clone)]
pub struct AddPaymentInput {
    /// Record being paid.
    pub record_id: DuesRecordId,
    /// Payment date; also the date of a resulting promotion income.
    pub date: NaiveDate,
    /// Amount; must be positive.
    pub amount: Decimal,
    /// Note; defaults to [`DEFAULT_PAYMENT_NOTE`].
    pub note: Option<String>,
    /// Collection method.
    pub method: PaymentMethod,
    /// Receipt or bank reference.
    pub receipt_ref: Option<String>,
}

/// Ledger side effect of a payment change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconcileOutcome {
    /// The record completed and was linked to this income.
    Promoted {
        /// Linked income.
        income_id: IncomeId,
    },
    /// The record regressed and this income was deleted.
    Demoted {
        /// Deleted income.
        income_id: IncomeId,
    },
    /// No ledger change.
    Unchanged,
}

/// Dues record with its payment total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuesRecordView {
    /// Record id.
    pub id: DuesRecordId,
    /// Member.
    pub member_id: MemberId,
    /// Fiscal year.
    pub year: i32,
    /// Annual amount owed.
    pub owed: Decimal,
    /// Sum of payments.
    pub paid: Decimal,
    /// Remaining amount; negative on overpayment.
    pub remaining: Decimal,
    /// Status.
    pub status: DuesStatus,
    /// Linked income while promoted.
    pub income_id: Option<IncomeId>,
}

impl DuesRecordView {
    fn from_model(model: &aidat_takip::Model, paid: Decimal) -> Result<Self, StoreError> {
        Ok(Self {
            id: DuesRecordId(model.aidat_id),
            member_id: MemberId(model.uye_id),
            year: model.yil,
            owed: model.yillik_aidat_tutari,
            paid,
            remaining: model.odenecek_tutar,
            status: stored_status(model)?,
            income_id: model.gelir_id.map(IncomeId),
        })
    }

    /// True while the record is promoted to an income.
    #[must_use]
    pub const fn is_promoted(&self) -> bool {
        self.income_id.is_some()
    }
}

/// Result of adding or removing a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentChange {
    /// Record after recomputation.
    pub record: DuesRecordView,
    /// Added or removed payment.
    pub payment_id: DuesPaymentId,
    /// Ledger side effect.
    pub outcome: ReconcileOutcome,
}

/// Dues tracker repository.
#[derive(Debug, Clone)]
pub struct DuesRepository {
    db: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
    members: Arc<dyn MemberDirectory>,
    settings: DuesSettings,
}

impl DuesRepository {
    /// Creates a new dues repository.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        audit: Arc<dyn AuditSink>,
        members: Arc<dyn MemberDirectory>,
        settings: DuesSettings,
    ) -> Self {
        Self {
            db,
            audit,
            members,
            settings,
        }
    }

    /// Returns the member's record for `year`, creating it if missing.
    pub async fn ensure_record(
        &self,
        ctx: &ActorContext,
        member_id: MemberId,
        year: i32,
    ) -> Result<DuesRecordView, StoreError> {
        ctx.require(Permission::CollectDues)?;
        let member = self.member(member_id).await?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);
        let (record, _) = ensure_in(
            &txn,
            &mut journal,
            &member,
            year,
            None,
            self.settings.default_annual_dues,
        )
        .await?;
        let paid = paid_total(&txn, record.aidat_id).await?;
        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        DuesRecordView::from_model(&record, paid)
    }

    /// Creates the member's record for `year`.
    ///
    /// `amount` replaces the default dues; the member's custom amount and
    /// discount still apply.
    pub async fn create_record(
        &self,
        ctx: &ActorContext,
        member_id: MemberId,
        year: i32,
        amount: Option<Decimal>,
    ) -> Result<DuesRecordView, StoreError> {
        ctx.require(Permission::EditDues)?;
        let member = self.member(member_id).await?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);
        let (record, created) = ensure_in(
            &txn,
            &mut journal,
            &member,
            year,
            amount,
            self.settings.default_annual_dues,
        )
        .await?;
        if !created {
            return Err(DuesError::DuplicateRecord { member_id, year }.into());
        }
        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        DuesRecordView::from_model(&record, Decimal::ZERO)
    }

    /// Records a payment and reconciles the record.
    pub async fn add_payment(
        &self,
        ctx: &ActorContext,
        input: AddPaymentInput,
    ) -> Result<PaymentChange, StoreError> {
        ctx.require(Permission::CollectDues)?;
        if input.amount <= Decimal::ZERO {
            return Err(DuesError::NonPositiveAmount(input.amount).into());
        }

        let member_name = {
            let record = load_record(&self.db, input.record_id).await?;
            self.member_name(MemberId(record.uye_id)).await?
        };

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let record = load_record(&txn, input.record_id).await?;
        let payment = aidat_odemeleri::ActiveModel {
            aidat_id: Set(record.aidat_id),
            tarih: Set(input.date),
            tutar: Set(input.amount),
            aciklama: Set(input
                .note
                .filter(|note| !note.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PAYMENT_NOTE.to_string())),
            tahsilat_turu: Set(input.method.as_str().to_string()),
            dekont_no: Set(input.receipt_ref),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        journal.push_change(
            AuditOperation::Create,
            PAYMENTS,
            payment.odeme_id,
            format!("payment of {} to dues record {}", payment.tutar, record.aidat_id),
            None,
            snapshot(&payment),
        );

        let (record, outcome) = reconcile_in(
            &txn,
            &mut journal,
            record,
            Promotion {
                member_name: &member_name,
                date: input.date,
                account_name: &self.settings.default_account_name,
                adopt: None,
            },
        )
        .await?;
        let paid = paid_total(&txn, record.aidat_id).await?;

        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(
            dues_id = record.aidat_id,
            payment_id = payment.odeme_id,
            amount = %payment.tutar,
            status = %record.durum,
            ?outcome,
            "dues payment recorded"
        );
        Ok(PaymentChange {
            record: DuesRecordView::from_model(&record, paid)?,
            payment_id: DuesPaymentId(payment.odeme_id),
            outcome,
        })
    }

    /// Deletes a payment and reconciles its record.
    ///
    /// A promotion caused by the removal would be dated today; in practice a
    /// removal only ever demotes.
    pub async fn remove_payment(
        &self,
        ctx: &ActorContext,
        payment_id: DuesPaymentId,
    ) -> Result<PaymentChange, StoreError> {
        ctx.require(Permission::EditDues)?;

        let member_name = {
            let payment = load_payment(&self.db, payment_id).await?;
            let record = load_record(&self.db, DuesRecordId(payment.aidat_id)).await?;
            self.member_name(MemberId(record.uye_id)).await?
        };

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let payment = load_payment(&txn, payment_id).await?;
        let record = load_record(&txn, DuesRecordId(payment.aidat_id)).await?;
        aidat_odemeleri::Entity::delete_by_id(payment.odeme_id)
            .exec(&txn)
            .await?;
        journal.push_change(
            AuditOperation::Delete,
            PAYMENTS,
            payment.odeme_id,
            format!("payment of {} removed from dues record {}", payment.tutar, record.aidat_id),
            snapshot(&payment),
            None,
        );

        let (record, outcome) = reconcile_in(
            &txn,
            &mut journal,
            record,
            Promotion {
                member_name: &member_name,
                date: chrono::Local::now().date_naive(),
                account_name: &self.settings.default_account_name,
                adopt: None,
            },
        )
        .await?;
        let paid = paid_total(&txn, record.aidat_id).await?;

        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(
            dues_id = record.aidat_id,
            payment_id = payment.odeme_id,
            status = %record.durum,
            ?outcome,
            "dues payment removed"
        );
        Ok(PaymentChange {
            record: DuesRecordView::from_model(&record, paid)?,
            payment_id,
            outcome,
        })
    }

    /// Creates a record for `year` for every active member lacking one.
    ///
    /// Returns the number of records created.
    pub async fn bulk_generate(
        &self,
        ctx: &ActorContext,
        year: i32,
        per_member_amount: Option<Decimal>,
    ) -> Result<u32, StoreError> {
        ctx.require(Permission::EditDues)?;
        if let Some(amount) = per_member_amount
            && amount <= Decimal::ZERO
        {
            return Err(DuesError::NonPositiveAmount(amount).into());
        }

        let members = self.members.list_active().await?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);
        let mut created = 0_u32;
        for member in &members {
            let (_, is_new) = ensure_in(
                &txn,
                &mut journal,
                member,
                year,
                per_member_amount,
                self.settings.default_annual_dues,
            )
            .await?;
            if is_new {
                created += 1;
            }
        }
        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(year, created, members = members.len(), "dues records generated");
        Ok(created)
    }

    /// Lists records by member and year with their paid totals.
    pub async fn list_records(
        &self,
        member_id: Option<MemberId>,
        year: Option<i32>,
    ) -> Result<Vec<DuesRecordView>, StoreError> {
        let mut query = aidat_takip::Entity::find();
        if let Some(member_id) = member_id {
            query = query.filter(aidat_takip::Column::UyeId.eq(member_id.into_inner()));
        }
        if let Some(year) = year {
            query = query.filter(aidat_takip::Column::Yil.eq(year));
        }
        let records = query
            .order_by_asc(aidat_takip::Column::Yil)
            .order_by_asc(aidat_takip::Column::UyeId)
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = records.iter().map(|r| r.aidat_id).collect();
        let rows: Vec<(i32, Decimal)> = aidat_odemeleri::Entity::find()
            .select_only()
            .column(aidat_odemeleri::Column::AidatId)
            .column(aidat_odemeleri::Column::Tutar)
            .filter(aidat_odemeleri::Column::AidatId.is_in(ids))
            .into_tuple()
            .all(&self.db)
            .await?;
        let mut paid: HashMap<i32, Decimal> = HashMap::new();
        for (record_id, amount) in rows {
            *paid.entry(record_id).or_default() += amount;
        }

        records
            .iter()
            .map(|record| {
                let total = paid.get(&record.aidat_id).copied().unwrap_or_default();
                DuesRecordView::from_model(record, total)
            })
            .collect()
    }

    /// Payments of a record, oldest first.
    pub async fn payments(
        &self,
        record_id: DuesRecordId,
    ) -> Result<Vec<aidat_odemeleri::Model>, StoreError> {
        load_record(&self.db, record_id).await?;
        Ok(aidat_odemeleri::Entity::find()
            .filter(aidat_odemeleri::Column::AidatId.eq(record_id.into_inner()))
            .order_by_asc(aidat_odemeleri::Column::Tarih)
            .order_by_asc(aidat_odemeleri::Column::OdemeId)
            .all(&self.db)
            .await?)
    }

    /// Checks the record against its payments and its linked income.
    pub async fn verify_invariants(&self, record_id: DuesRecordId) -> Result<(), StoreError> {
        let record = load_record(&self.db, record_id).await?;
        let state = promotion_state(&record)?;
        let payments = payment_amounts(&self.db, record.aidat_id).await?;

        let linked_amount = match record.gelir_id {
            Some(income_id) => {
                let income = gelirler::Entity::find_by_id(income_id).one(&self.db).await?;
                match income {
                    Some(income) if income.aidat_id != Some(record.aidat_id) => {
                        return Err(DuesError::InvariantViolation {
                            record_id,
                            detail: format!("income {income_id} does not point back at the record"),
                        }
                        .into());
                    }
                    Some(income) => Some(income.tutar),
                    None => None,
                }
            }
            None => None,
        };

        verify_record(
            record_id,
            record.yillik_aidat_tutari,
            record.odenecek_tutar,
            stored_status(&record)?,
            &payments,
            state,
            linked_amount,
        )?;
        Ok(())
    }

    async fn member(&self, member_id: MemberId) -> Result<MemberProjection, StoreError> {
        self.members
            .get(member_id)
            .await?
            .ok_or_else(|| DuesError::MemberNotFound(member_id).into())
    }

    async fn member_name(&self, member_id: MemberId) -> Result<String, StoreError> {
        Ok(self
            .members
            .get(member_id)
            .await?
            .map_or_else(|| format!("Üye #{member_id}"), |member| member.name))
    }
}

/// How a promotion is carried out.
#[derive(Debug)]
pub(crate) struct Promotion<'a> {
    pub member_name: &'a str,
    pub date: NaiveDate,
    pub account_name: &'a str,
    /// Existing income to link instead of creating one.
    pub adopt: Option<gelirler::Model>,
}

async fn load_record<C: ConnectionTrait>(
    conn: &C,
    id: DuesRecordId,
) -> Result<aidat_takip::Model, StoreError> {
    aidat_takip::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or_else(|| DuesError::RecordNotFound(id).into())
}

async fn load_payment<C: ConnectionTrait>(
    conn: &C,
    id: DuesPaymentId,
) -> Result<aidat_odemeleri::Model, StoreError> {
    aidat_odemeleri::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or_else(|| DuesError::PaymentNotFound(id).into())
}

async fn payment_amounts<C: ConnectionTrait>(
    conn: &C,
    record_id: i32,
) -> Result<Vec<Decimal>, StoreError> {
    Ok(aidat_odemeleri::Entity::find()
        .select_only()
        .column(aidat_odemeleri::Column::Tutar)
        .filter(aidat_odemeleri::Column::AidatId.eq(record_id))
        .into_tuple()
        .all(conn)
        .await?)
}

async fn paid_total<C: ConnectionTrait>(conn: &C, record_id: i32) -> Result<Decimal, StoreError> {
    Ok(payment_amounts(conn, record_id).await?.into_iter().sum())
}

fn stored_status(record: &aidat_takip::Model) -> Result<DuesStatus, StoreError> {
    record
        .durum
        .parse()
        .map_err(|e: String| StoreError::corrupt(TABLE, e))
}

fn promotion_state(record: &aidat_takip::Model) -> Result<PromotionState, StoreError> {
    let flag: PromotionFlag = record
        .aktarim_durumu
        .parse()
        .map_err(|e: String| StoreError::corrupt(TABLE, e))?;
    Ok(PromotionState {
        flag,
        income_id: record.gelir_id.map(IncomeId),
    })
}

/// Returns the member's record for `year`, creating it when missing.
///
/// The flag is true when the record was created.
pub(crate) async fn ensure_in<C: ConnectionTrait>(
    conn: &C,
    journal: &mut AuditJournal,
    member: &MemberProjection,
    year: i32,
    requested: Option<Decimal>,
    default_dues: Decimal,
) -> Result<(aidat_takip::Model, bool), StoreError> {
    let existing = aidat_takip::Entity::find()
        .filter(aidat_takip::Column::UyeId.eq(member.id.into_inner()))
        .filter(aidat_takip::Column::Yil.eq(year))
        .one(conn)
        .await?;
    if let Some(record) = existing {
        return Ok((record, false));
    }

    let owed = resolve_annual_dues(member, requested, default_dues)?;
    let record = aidat_takip::ActiveModel {
        uye_id: Set(member.id.into_inner()),
        yil: Set(year),
        yillik_aidat_tutari: Set(owed),
        odenecek_tutar: Set(owed),
        durum: Set(DuesStatus::Missing.as_str().to_string()),
        aktarim_durumu: Set(PromotionFlag::NotPromoted.as_str().to_string()),
        gelir_id: Set(None),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    journal.push_change(
        AuditOperation::Create,
        TABLE,
        record.aidat_id,
        format!("{} dues for {year}: {owed}", member.name),
        None,
        snapshot(&record),
    );
    tracing::debug!(
        dues_id = record.aidat_id,
        member_id = %member.id,
        year,
        %owed,
        "dues record created"
    );
    Ok((record, true))
}

/// Recomputes `record` from its payments and applies the promotion rule.
pub(crate) async fn reconcile_in<C: ConnectionTrait>(
    conn: &C,
    journal: &mut AuditJournal,
    record: aidat_takip::Model,
    promotion: Promotion<'_>,
) -> Result<(aidat_takip::Model, ReconcileOutcome), StoreError> {
    let record_id = DuesRecordId(record.aidat_id);
    let state = promotion_state(&record)?;
    let payments = payment_amounts(conn, record.aidat_id).await?;
    let totals = recompute(record.yillik_aidat_tutari, &payments);
    let action = reconcile_action(record_id, record.yillik_aidat_tutari, &totals, state)?;

    let before = snapshot(&record);
    let mut active: aidat_takip::ActiveModel = record.clone().into();
    active.odenecek_tutar = Set(totals.remaining);
    active.durum = Set(totals.status.as_str().to_string());

    let outcome = match (action, promotion.adopt) {
        (ReconcileAction::Promote { .. }, Some(income)) => {
            let income_id = income.gelir_id;
            let mut linked: gelirler::ActiveModel = income.into();
            linked.aidat_id = Set(Some(record.aidat_id));
            linked.update(conn).await?;

            active.aktarim_durumu = Set(PromotionFlag::Promoted.as_str().to_string());
            active.gelir_id = Set(Some(income_id));
            ReconcileOutcome::Promoted {
                income_id: IncomeId(income_id),
            }
        }
        (ReconcileAction::Promote { amount }, None) => {
            let account = kasalar::Entity::find()
                .filter(kasalar::Column::KasaAdi.eq(promotion.account_name))
                .one(conn)
                .await?
                .ok_or_else(|| {
                    LedgerError::AccountNameNotFound(promotion.account_name.to_string())
                })?;
            if !account.aktif {
                return Err(LedgerError::AccountInactive(CashAccountId(account.kasa_id)).into());
            }

            let income = insert_income_in(
                conn,
                journal,
                IncomeRow {
                    date: promotion.date,
                    category: IncomeCategory::Dues,
                    description: promotion_description(promotion.member_name, record.yil),
                    amount,
                    account_id: account.kasa_id,
                    belongs_to_year: record.yil,
                    status: AccrualStatus::classify(record.yil, promotion.date.year()),
                    batch_id: None,
                    dues_id: Some(record.aidat_id),
                },
            )
            .await?;

            active.aktarim_durumu = Set(PromotionFlag::Promoted.as_str().to_string());
            active.gelir_id = Set(Some(income.gelir_id));
            ReconcileOutcome::Promoted {
                income_id: IncomeId(income.gelir_id),
            }
        }
        (_, Some(income)) => {
            return Err(DuesError::InvariantViolation {
                record_id,
                detail: format!("income {} could not be adopted", income.gelir_id),
            }
            .into());
        }
        (ReconcileAction::Demote { income_id }, None) => {
            let income = gelirler::Entity::find_by_id(income_id.into_inner())
                .one(conn)
                .await?
                .ok_or_else(|| DuesError::InvariantViolation {
                    record_id,
                    detail: format!("linked income {income_id} is missing"),
                })?;

            let mut unlinked: gelirler::ActiveModel = income.into();
            unlinked.aidat_id = Set(None);
            let income = unlinked.update(conn).await?;
            delete_income_in(conn, journal, income).await?;

            active.aktarim_durumu = Set(PromotionFlag::NotPromoted.as_str().to_string());
            active.gelir_id = Set(None);
            ReconcileOutcome::Demoted { income_id }
        }
        (ReconcileAction::Nothing, None) => ReconcileOutcome::Unchanged,
    };

    let record = active.update(conn).await?;
    journal.push_change(
        match outcome {
            ReconcileOutcome::Unchanged => AuditOperation::Update,
            _ => AuditOperation::Automatic,
        },
        TABLE,
        record.aidat_id,
        format!("dues record {} is {}", record.aidat_id, record.durum),
        before,
        snapshot(&record),
    );
    Ok((record, outcome))
}

/// Collects the year of a multi-year dues income into the member's record
/// and links the income as the record's promoted income.
pub(crate) async fn collect_with_batch_income_in<C: ConnectionTrait>(
    conn: &C,
    journal: &mut AuditJournal,
    member: &MemberProjection,
    settings: &DuesSettings,
    income: gelirler::Model,
) -> Result<gelirler::Model, StoreError> {
    let year = income.ait_oldugu_yil;
    let (record, _) = ensure_in(
        conn,
        journal,
        member,
        year,
        None,
        settings.default_annual_dues,
    )
    .await?;

    if stored_status(&record)?.is_complete() {
        return Err(DuesError::AlreadyComplete {
            member_id: member.id,
            year,
        }
        .into());
    }
    if record.yillik_aidat_tutari != income.tutar {
        return Err(DuesError::MultiYearAmountMismatch {
            year,
            owed: record.yillik_aidat_tutari,
            per_year: income.tutar,
        }
        .into());
    }

    let payment = aidat_odemeleri::ActiveModel {
        aidat_id: Set(record.aidat_id),
        tarih: Set(income.tarih),
        tutar: Set(income.tutar),
        aciklama: Set(DEFAULT_PAYMENT_NOTE.to_string()),
        tahsilat_turu: Set(PaymentMethod::MultiYear.as_str().to_string()),
        dekont_no: Set(Some(income.belge_no.clone())),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    journal.push_change(
        AuditOperation::Automatic,
        PAYMENTS,
        payment.odeme_id,
        format!("{} collected with {}", year, income.belge_no),
        None,
        snapshot(&payment),
    );

    let income_id = income.gelir_id;
    let (record, _) = reconcile_in(
        conn,
        journal,
        record,
        Promotion {
            member_name: &member.name,
            date: income.tarih,
            account_name: &settings.default_account_name,
            adopt: Some(income),
        },
    )
    .await?;

    tracing::debug!(dues_id = record.aidat_id, income_id, year, "batch income linked to dues");
    gelirler::Entity::find_by_id(income_id)
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::IncomeNotFound(IncomeId(income_id)).into())
}
