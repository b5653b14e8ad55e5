//! `SeaORM` Entity for the tahakkuklar (accruals) table.
//!
//! `kaynak_id` points into `gelirler` or `giderler` depending on
//! `kaynak_tablo`, so there is no foreign key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tahakkuklar")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub tahakkuk_id: i32,
    pub tahakkuk_turu: String,
    pub kaynak_tablo: String,
    pub kaynak_id: i32,
    pub tahsil_yili: i32,
    pub ait_oldugu_yil: i32,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub tutar: Decimal,
    pub durum: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
