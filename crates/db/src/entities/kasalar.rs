//! `SeaORM` Entity for the kasalar (cash accounts) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kasalar")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub kasa_id: i32,
    #[sea_orm(unique)]
    pub kasa_adi: String,
    pub para_birimi: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub devir_bakiye: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub serbest_devir_bakiye: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub tahakkuk_toplami: Decimal,
    pub son_devir_tarihi: Option<Date>,
    pub aktif: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
