//! `SeaORM` Entity for the aidat_takip (dues records) table.
//!
//! One row per (member, year). `(uye_id, yil)` is unique; the index is
//! created by the initial migration.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "aidat_takip")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub aidat_id: i32,
    pub uye_id: i32,
    pub yil: i32,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub yillik_aidat_tutari: Decimal,
    /// Remaining amount; negative on overpayment.
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub odenecek_tutar: Decimal,
    pub durum: String,
    pub aktarim_durumu: String,
    pub gelir_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::aidat_odemeleri::Entity")]
    AidatOdemeleri,
}

impl Related<super::aidat_odemeleri::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AidatOdemeleri.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
