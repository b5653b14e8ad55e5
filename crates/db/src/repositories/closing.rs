//! Year-end closing repository.

use std::sync::Arc;

use dernek_core::audit::{AuditJournal, AuditOperation, AuditSink};
use dernek_core::auth::{ActorContext, Permission};
use dernek_core::closing::{
    year_end, AccountFigures, ClosingError, ClosingService, ClosureReport,
};
use dernek_shared::config::ClosingSettings;
use dernek_shared::types::CashAccountId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::accrual::consume_in;
use super::cash_account::{
    active_accounts, apply_closure, compute_free_balance, currency_of, load_account,
};
use crate::entities::{devir_islemleri, kasalar};
use crate::error::StoreError;

const TABLE: &str = "devir_islemleri";

/// Year-end closing repository.
#[derive(Debug, Clone)]
pub struct ClosingRepository {
    db: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
    service: ClosingService,
}

impl ClosingRepository {
    /// Creates a new closing repository.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        audit: Arc<dyn AuditSink>,
        settings: ClosingSettings,
    ) -> Self {
        Self {
            db,
            audit,
            service: ClosingService::new(settings.high_accrual_ratio),
        }
    }

    /// Closes `year` for one account.
    ///
    /// With `simulate` the report is computed and nothing is written.
    pub async fn compute_closure(
        &self,
        ctx: &ActorContext,
        account_id: CashAccountId,
        year: i32,
        simulate: bool,
    ) -> Result<ClosureReport, StoreError> {
        if simulate {
            let account = load_account(&self.db, account_id).await?;
            return self.evaluate(&self.db, vec![account], year, true).await;
        }

        ctx.require(Permission::CloseYear)?;
        let txn = self.db.begin().await?;
        let account = load_account(&txn, account_id).await?;
        let report = self.evaluate(&txn, vec![account], year, false).await?;
        let journal = persist_in(&txn, ctx, &report).await?;
        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(year, account_id = %account_id, "account closed");
        Ok(report)
    }

    /// Closes `year` for every active account not yet closed for it.
    pub async fn close_year(
        &self,
        ctx: &ActorContext,
        year: i32,
        simulate: bool,
    ) -> Result<ClosureReport, StoreError> {
        if simulate {
            let accounts = still_open(active_accounts(&self.db).await?, year)?;
            return self.evaluate(&self.db, accounts, year, true).await;
        }

        ctx.require(Permission::CloseYear)?;
        let txn = self.db.begin().await?;
        let accounts = still_open(active_accounts(&txn).await?, year)?;
        let report = self.evaluate(&txn, accounts, year, false).await?;
        let journal = persist_in(&txn, ctx, &report).await?;
        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(
            year,
            accounts = report.accounts.len(),
            physical = %report.totals.physical,
            free = %report.totals.free,
            "year closed"
        );
        Ok(report)
    }

    /// Confirmed closures, oldest first.
    pub async fn list_closures(&self) -> Result<Vec<devir_islemleri::Model>, StoreError> {
        Ok(devir_islemleri::Entity::find()
            .order_by_asc(devir_islemleri::Column::Yil)
            .all(&self.db)
            .await?)
    }

    /// Confirmed closure of `year`.
    pub async fn find_closure(
        &self,
        year: i32,
    ) -> Result<Option<devir_islemleri::Model>, StoreError> {
        Ok(find_closure_in(&self.db, year).await?)
    }

    /// Stored report of the confirmed closure of `year`.
    pub async fn find_report(&self, year: i32) -> Result<Option<ClosureReport>, StoreError> {
        match find_closure_in(&self.db, year).await? {
            Some(closure) => Ok(Some(serde_json::from_str(&closure.rapor_json)?)),
            None => Ok(None),
        }
    }

    async fn evaluate<C: ConnectionTrait>(
        &self,
        conn: &C,
        accounts: Vec<kasalar::Model>,
        year: i32,
        simulated: bool,
    ) -> Result<ClosureReport, StoreError> {
        let closed_on = year_end(year)?;
        let mut figures = Vec::with_capacity(accounts.len());
        for account in accounts {
            match account.son_devir_tarihi {
                Some(last) if last == closed_on => {
                    return Err(ClosingError::AlreadyClosed(year).into());
                }
                Some(last) if last > closed_on => {
                    return Err(ClosingError::ClosedLater {
                        year,
                        last_closure: last,
                    }
                    .into());
                }
                _ => {}
            }

            let balance = compute_free_balance(conn, &account, closed_on).await?;
            figures.push(AccountFigures {
                account_id: CashAccountId(account.kasa_id),
                currency: currency_of(&account)?,
                account_name: account.kasa_adi,
                physical: balance.physical,
                accrued_income: balance.accrued_income,
                accrued_expense: balance.accrued_expense,
                by_year: balance.by_year,
            });
        }

        let report = self.service.build_report(year, simulated, figures)?;
        for warning in &report.warnings {
            tracing::warn!(
                year,
                account_id = %warning.account_id,
                kind = warning.kind.as_str(),
                "{}",
                warning.message
            );
        }
        Ok(report)
    }
}

async fn find_closure_in<C: ConnectionTrait>(
    conn: &C,
    year: i32,
) -> Result<Option<devir_islemleri::Model>, sea_orm::DbErr> {
    devir_islemleri::Entity::find()
        .filter(devir_islemleri::Column::Yil.eq(year))
        .one(conn)
        .await
}

/// Drops the accounts already closed for `year`. Fails when every account
/// is.
fn still_open(
    accounts: Vec<kasalar::Model>,
    year: i32,
) -> Result<Vec<kasalar::Model>, ClosingError> {
    let closed_on = year_end(year)?;
    if accounts.is_empty() {
        return Ok(accounts);
    }
    let open: Vec<_> = accounts
        .into_iter()
        .filter(|account| account.son_devir_tarihi != Some(closed_on))
        .collect();
    if open.is_empty() {
        Err(ClosingError::AlreadyClosed(year))
    } else {
        Ok(open)
    }
}

/// Writes or extends the closure row of the year, carries the figures into
/// the accounts and realises their accruals of the closed year.
async fn persist_in<C: ConnectionTrait>(
    conn: &C,
    ctx: &ActorContext,
    report: &ClosureReport,
) -> Result<AuditJournal, StoreError> {
    let mut journal = AuditJournal::new(ctx);

    let closure = match find_closure_in(conn, report.year).await? {
        Some(existing) => {
            let mut merged: ClosureReport = serde_json::from_str(&existing.rapor_json)?;
            merged.absorb(report.clone());
            let mut row = existing.into_active_model();
            row.toplam_fiziksel = Set(merged.totals.physical);
            row.toplam_tahakkuk = Set(merged.totals.accrued);
            row.toplam_serbest = Set(merged.totals.free);
            row.rapor_json = Set(serde_json::to_string(&merged)?);
            row.update(conn).await?
        }
        None => {
            devir_islemleri::ActiveModel {
                yil: Set(report.year),
                devir_tarihi: Set(report.closure_date),
                toplam_fiziksel: Set(report.totals.physical),
                toplam_tahakkuk: Set(report.totals.accrued),
                toplam_serbest: Set(report.totals.free),
                rapor_json: Set(serde_json::to_string(report)?),
                aciklama: Set(Some(format!("{} yılı devri", report.year))),
                ..Default::default()
            }
            .insert(conn)
            .await?
        }
    };
    journal.push(
        AuditOperation::Closure,
        TABLE,
        closure.devir_id,
        format!(
            "{} closed for {} account(s): physical {}, accrued {}, free {}",
            report.year,
            report.accounts.len(),
            report.totals.physical,
            report.totals.accrued,
            report.totals.free
        ),
    );

    let mut account_ids = Vec::with_capacity(report.accounts.len());
    for account in &report.accounts {
        apply_closure(
            conn,
            account.account_id.into_inner(),
            account.physical,
            account.free,
            account.accrued_income,
            report.closure_date,
        )
        .await?;
        journal.push(
            AuditOperation::Closure,
            "kasalar",
            account.account_id.into_inner(),
            format!(
                "{} carried into {}: opening {}, free {}",
                account.account_name,
                report.year + 1,
                account.physical,
                account.free
            ),
        );
        account_ids.push(account.account_id.into_inner());
    }

    let consumed = consume_in(conn, &mut journal, report.year, &account_ids).await?;
    tracing::debug!(year = report.year, consumed, "accruals realised");
    Ok(journal)
}
