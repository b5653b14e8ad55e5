//! `SeaORM` Entity for the uyeler (members) table.
//!
//! Only the columns the ledger reads; the member registry owns the rest.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "uyeler")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub uye_id: i32,
    pub ad_soyad: String,
    pub durum: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub ozel_aidat_tutari: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub aidat_indirimi_yuzde: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
