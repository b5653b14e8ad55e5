//! `SeaORM` Entity for the aidat_odemeleri (dues payments) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "aidat_odemeleri")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub odeme_id: i32,
    pub aidat_id: i32,
    pub tarih: Date,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub tutar: Decimal,
    pub aciklama: String,
    pub tahsilat_turu: String,
    pub dekont_no: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::aidat_takip::Entity",
        from = "Column::AidatId",
        to = "super::aidat_takip::Column::AidatId",
        on_delete = "Cascade"
    )]
    AidatTakip,
}

impl Related<super::aidat_takip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AidatTakip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
