//! Member directory.
//!
//! The dues tracker only reads a small projection of each member. The
//! directory is a trait so the member registry can live elsewhere.

use std::fmt::Debug;

use async_trait::async_trait;
use dernek_core::audit::{AuditJournal, AuditOperation, AuditSink};
use dernek_core::auth::{ActorContext, Permission};
use dernek_core::dues::DuesError;
use dernek_core::members::{MemberProjection, MemberStatus};
use dernek_shared::config::MemberDeletionMode;
use dernek_shared::types::MemberId;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{aidat_takip, gelirler, uyeler};
use crate::error::StoreError;

/// Read access to members.
#[async_trait]
pub trait MemberDirectory: Send + Sync + Debug {
    /// Looks up one member.
    async fn get(&self, id: MemberId) -> Result<Option<MemberProjection>, StoreError>;

    /// Lists active members.
    async fn list_active(&self) -> Result<Vec<MemberProjection>, StoreError>;
}

/// Fixed in-memory member list.
#[derive(Debug, Clone, Default)]
pub struct StaticMemberDirectory {
    members: Vec<MemberProjection>,
}

impl StaticMemberDirectory {
    /// Creates a directory over `members`.
    #[must_use]
    pub fn new(members: Vec<MemberProjection>) -> Self {
        Self { members }
    }
}

#[async_trait]
impl MemberDirectory for StaticMemberDirectory {
    async fn get(&self, id: MemberId) -> Result<Option<MemberProjection>, StoreError> {
        Ok(self.members.iter().find(|m| m.id == id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<MemberProjection>, StoreError> {
        Ok(self.members.iter().filter(|m| m.is_active()).cloned().collect())
    }
}

/// Input for registering a member.
#[derive(Debug, Clone)]
pub struct NewMemberInput {
    /// Display name.
    pub name: String,
    /// Custom annual dues.
    pub custom_annual_dues: Option<Decimal>,
    /// Discount on the default dues, in percent.
    pub discount_percent: Option<Decimal>,
}

/// Members stored in the `uyeler` table.
#[derive(Debug, Clone)]
pub struct DbMemberDirectory {
    db: DatabaseConnection,
}

impl DbMemberDirectory {
    /// Creates a directory over the store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers an active member.
    pub async fn add(&self, input: NewMemberInput) -> Result<MemberProjection, StoreError> {
        let model = uyeler::ActiveModel {
            ad_soyad: Set(input.name.trim().to_string()),
            durum: Set(MemberStatus::Active.as_str().to_string()),
            ozel_aidat_tutari: Set(input.custom_annual_dues),
            aidat_indirimi_yuzde: Set(input.discount_percent),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::debug!(member_id = model.uye_id, "member registered");
        to_projection(model)
    }

    /// Removes a member according to `mode`.
    ///
    /// Soft deletion marks the member as departed and keeps all history.
    /// Cascade deletion removes the member with its dues records and
    /// payments; promoted incomes stay in the ledger, unlinked.
    pub async fn remove(
        &self,
        ctx: &ActorContext,
        audit: &dyn AuditSink,
        id: MemberId,
        mode: MemberDeletionMode,
    ) -> Result<(), StoreError> {
        ctx.require(Permission::EditDues)?;

        let txn = self.db.begin().await?;
        let mut journal = AuditJournal::new(ctx);

        let member = uyeler::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(DuesError::MemberNotFound(id))?;

        match mode {
            MemberDeletionMode::SoftDelete => {
                let mut active: uyeler::ActiveModel = member.into();
                active.durum = Set(MemberStatus::Departed.as_str().to_string());
                active.update(&txn).await?;
                journal.push(AuditOperation::Update, "uyeler", id.into_inner(), "member departed");
            }
            MemberDeletionMode::Cascade => {
                let records = aidat_takip::Entity::find()
                    .filter(aidat_takip::Column::UyeId.eq(id.into_inner()))
                    .all(&txn)
                    .await?;

                for record in records {
                    if let Some(income_id) = record.gelir_id {
                        let income = gelirler::Entity::find_by_id(income_id).one(&txn).await?;
                        if let Some(income) = income {
                            let mut income: gelirler::ActiveModel = income.into();
                            income.aidat_id = Set(None);
                            income.update(&txn).await?;
                        }
                    }
                    // Payments go with the record through the foreign key.
                    let record_id = record.aidat_id;
                    aidat_takip::Entity::delete_by_id(record_id).exec(&txn).await?;
                    journal.push(
                        AuditOperation::Delete,
                        "aidat_takip",
                        record_id,
                        "member deleted",
                    );
                }

                uyeler::Entity::delete_by_id(id.into_inner()).exec(&txn).await?;
                journal.push(AuditOperation::Delete, "uyeler", id.into_inner(), "member deleted");
            }
        }

        txn.commit().await?;
        journal.flush(audit);

        tracing::info!(member_id = id.into_inner(), ?mode, "member removed");
        Ok(())
    }
}

#[async_trait]
impl MemberDirectory for DbMemberDirectory {
    async fn get(&self, id: MemberId) -> Result<Option<MemberProjection>, StoreError> {
        uyeler::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(to_projection)
            .transpose()
    }

    async fn list_active(&self) -> Result<Vec<MemberProjection>, StoreError> {
        uyeler::Entity::find()
            .filter(uyeler::Column::Durum.eq(MemberStatus::Active.as_str()))
            .order_by_asc(uyeler::Column::UyeId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_projection)
            .collect()
    }
}

fn to_projection(model: uyeler::Model) -> Result<MemberProjection, StoreError> {
    let status = model
        .durum
        .parse::<MemberStatus>()
        .map_err(|e| StoreError::corrupt("uyeler", e))?;
    Ok(MemberProjection {
        id: MemberId(model.uye_id),
        name: model.ad_soyad,
        custom_annual_dues: model.ozel_aidat_tutari.filter(|a| !a.is_zero()),
        discount_percent: model.aidat_indirimi_yuzde,
        status,
    })
}
