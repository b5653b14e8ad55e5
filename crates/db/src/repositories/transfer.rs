//! Transfers (virman) between cash accounts.

use std::sync::Arc;

use chrono::NaiveDate;
use dernek_core::audit::{AuditJournal, AuditOperation, AuditSink};
use dernek_core::auth::{ActorContext, Permission};
use dernek_core::ledger::{ensure_open, LedgerError};
use dernek_shared::types::{CashAccountId, TransferId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::cash_account::{ensure_period_open, load_active_account};
use super::snapshot;
use crate::entities::virmanlar;
use crate::error::StoreError;

const TABLE: &str = "virmanlar";

/// Input for a transfer.
#[derive(Debug, Clone)]
pub struct NewTransferInput {
    /// Transfer date.
    pub date: NaiveDate,
    /// Source account.
    pub from: CashAccountId,
    /// Destination account.
    pub to: CashAccountId,
    /// Amount; must be positive.
    pub amount: Decimal,
    /// Free-text description.
    pub description: String,
}

/// Transfer repository.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, audit: Arc<dyn AuditSink>) -> Self {
        Self { db, audit }
    }

    /// Moves `amount` from one active account to another.
    pub async fn add(
        &self,
        ctx: &ActorContext,
        input: NewTransferInput,
    ) -> Result<virmanlar::Model, StoreError> {
        ctx.require(Permission::Transfer)?;
        if input.from == input.to {
            return Err(LedgerError::SameAccount(input.from).into());
        }
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(input.amount).into());
        }

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let from = load_active_account(&txn, input.from).await?;
        let to = load_active_account(&txn, input.to).await?;
        ensure_open(input.from, from.son_devir_tarihi, input.date)?;
        ensure_open(input.to, to.son_devir_tarihi, input.date)?;

        let transfer = virmanlar::ActiveModel {
            tarih: Set(input.date),
            kaynak_kasa_id: Set(from.kasa_id),
            hedef_kasa_id: Set(to.kasa_id),
            tutar: Set(input.amount),
            aciklama: Set(input.description),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        journal.push_change(
            AuditOperation::Create,
            TABLE,
            transfer.virman_id,
            format!("{} {} -> {}", transfer.tutar, from.kasa_adi, to.kasa_adi),
            None,
            snapshot(&transfer),
        );

        txn.commit().await?;
        journal.flush(self.audit.as_ref());

        tracing::info!(
            transfer_id = transfer.virman_id,
            from = from.kasa_id,
            to = to.kasa_id,
            amount = %transfer.tutar,
            "transfer recorded"
        );
        Ok(transfer)
    }

    /// Deletes a transfer.
    pub async fn delete(&self, ctx: &ActorContext, id: TransferId) -> Result<(), StoreError> {
        ctx.require(Permission::Transfer)?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let transfer = virmanlar::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransferNotFound(id))?;
        ensure_period_open(&txn, transfer.kaynak_kasa_id, transfer.tarih).await?;
        ensure_period_open(&txn, transfer.hedef_kasa_id, transfer.tarih).await?;
        virmanlar::Entity::delete_by_id(transfer.virman_id)
            .exec(&txn)
            .await?;
        journal.push_change(
            AuditOperation::Delete,
            TABLE,
            transfer.virman_id,
            "transfer deleted",
            snapshot(&transfer),
            None,
        );

        txn.commit().await?;
        journal.flush(self.audit.as_ref());
        Ok(())
    }

    /// Transfers touching `account` (all when `None`), ordered by date.
    pub async fn list(
        &self,
        account: Option<CashAccountId>,
    ) -> Result<Vec<virmanlar::Model>, StoreError> {
        let mut query = virmanlar::Entity::find();
        if let Some(id) = account {
            query = query.filter(
                Condition::any()
                    .add(virmanlar::Column::KaynakKasaId.eq(id.into_inner()))
                    .add(virmanlar::Column::HedefKasaId.eq(id.into_inner())),
            );
        }
        Ok(query
            .order_by_asc(virmanlar::Column::Tarih)
            .order_by_asc(virmanlar::Column::VirmanId)
            .all(&self.db)
            .await?)
    }
}
