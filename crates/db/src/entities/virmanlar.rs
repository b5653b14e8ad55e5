//! `SeaORM` Entity for the virmanlar (transfers) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "virmanlar")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub virman_id: i32,
    pub tarih: Date,
    pub kaynak_kasa_id: i32,
    pub hedef_kasa_id: i32,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub tutar: Decimal,
    pub aciklama: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kasalar::Entity",
        from = "Column::KaynakKasaId",
        to = "super::kasalar::Column::KasaId",
        on_delete = "Restrict"
    )]
    KaynakKasa,
    #[sea_orm(
        belongs_to = "super::kasalar::Entity",
        from = "Column::HedefKasaId",
        to = "super::kasalar::Column::KasaId",
        on_delete = "Restrict"
    )]
    HedefKasa,
}

impl ActiveModelBehavior for ActiveModel {}
