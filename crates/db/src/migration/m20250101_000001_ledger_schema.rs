//! Ledger schema.
//!
//! Tables are derived from the entity definitions so the same migration
//! runs on the local SQLite store and the remote Postgres store.

use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entities::{
    aidat_odemeleri, aidat_takip, devir_islemleri, gelirler, giderler, kasalar, tahakkuklar,
    uyeler, virmanlar,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Referenced tables first.
        create(manager, &schema, kasalar::Entity).await?;
        create(manager, &schema, uyeler::Entity).await?;
        create(manager, &schema, gelirler::Entity).await?;
        create(manager, &schema, giderler::Entity).await?;
        create(manager, &schema, virmanlar::Entity).await?;
        create(manager, &schema, aidat_takip::Entity).await?;
        create(manager, &schema, aidat_odemeleri::Entity).await?;
        create(manager, &schema, tahakkuklar::Entity).await?;
        create(manager, &schema, devir_islemleri::Entity).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_aidat_takip_uye_yil")
                    .table(aidat_takip::Entity)
                    .col(aidat_takip::Column::UyeId)
                    .col(aidat_takip::Column::Yil)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gelirler_kasa_tarih")
                    .table(gelirler::Entity)
                    .col(gelirler::Column::KasaId)
                    .col(gelirler::Column::Tarih)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_giderler_kasa_tarih")
                    .table(giderler::Entity)
                    .col(giderler::Column::KasaId)
                    .col(giderler::Column::Tarih)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tahakkuklar_kaynak")
                    .table(tahakkuklar::Entity)
                    .col(tahakkuklar::Column::KaynakTablo)
                    .col(tahakkuklar::Column::KaynakId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse dependency order.
        drop_entity(manager, devir_islemleri::Entity).await?;
        drop_entity(manager, tahakkuklar::Entity).await?;
        drop_entity(manager, aidat_odemeleri::Entity).await?;
        drop_entity(manager, aidat_takip::Entity).await?;
        drop_entity(manager, virmanlar::Entity).await?;
        drop_entity(manager, giderler::Entity).await?;
        drop_entity(manager, gelirler::Entity).await?;
        drop_entity(manager, uyeler::Entity).await?;
        drop_entity(manager, kasalar::Entity).await?;
        Ok(())
    }
}

async fn create<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

async fn drop_entity<E: EntityTrait + 'static>(
    manager: &SchemaManager<'_>,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}
