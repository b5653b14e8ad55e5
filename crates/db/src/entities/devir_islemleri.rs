//! `SeaORM` Entity for the devir_islemleri (year closures) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "devir_islemleri")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub devir_id: i32,
    #[sea_orm(unique)]
    pub yil: i32,
    pub devir_tarihi: Date,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub toplam_fiziksel: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub toplam_tahakkuk: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub toplam_serbest: Decimal,
    #[sea_orm(column_type = "Text")]
    pub rapor_json: String,
    pub aciklama: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
