//! `SeaORM` Entity for the giderler (expense) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "giderler")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub gider_id: i32,
    pub tarih: Date,
    #[sea_orm(unique)]
    pub islem_no: String,
    pub gider_turu: String,
    pub aciklama: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub tutar: Decimal,
    pub kasa_id: i32,
    pub ait_oldugu_yil: i32,
    pub tahakkuk_durumu: String,
    pub coklu_odeme_grup_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kasalar::Entity",
        from = "Column::KasaId",
        to = "super::kasalar::Column::KasaId",
        on_delete = "Restrict"
    )]
    Kasalar,
}

impl Related<super::kasalar::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kasalar.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
