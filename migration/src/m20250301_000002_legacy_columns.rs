use sea_orm_migration::prelude::*;

use crate::m20250301_000001_init::{Invernaderos, Registros};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Databases from before the time-of-day field lack `hora`.
        if !manager.has_column("registros", "hora").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Registros::Table)
                        .add_column(ColumnDef::new(Registros::Hora).text())
                        .to_owned(),
                )
                .await?;
        }

        // Same for CO2, which arrived one release later.
        if !manager.has_column("registros", "co2").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Registros::Table)
                        .add_column(ColumnDef::new(Registros::Co2).double())
                        .to_owned(),
                )
                .await?;
        }

        let db = manager.get_connection();

        // Early releases stored "YYYY-MM-DD HH:MM:SS" in `fecha`. SQLite
        // evaluates every SET expression against the old row.
        db.execute_unprepared(
            "UPDATE registros \
             SET hora = COALESCE(hora, substr(fecha, 12, 5)), fecha = substr(fecha, 1, 10) \
             WHERE length(fecha) > 10",
        )
        .await?;

        // Names were never unique before; keep the oldest and suffix the rest
        // with their id so the unique index can be built.
        db.execute_unprepared(
            "UPDATE invernaderos \
             SET nombre = nombre || ' (' || id || ')' \
             WHERE id NOT IN (SELECT MIN(id) FROM invernaderos GROUP BY LOWER(nombre))",
        )
        .await?;

        // Case-insensitive unique index on greenhouse name
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS invernaderos_nombre_lower_idx ON invernaderos (LOWER(nombre))",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("invernaderos_nombre_lower_idx")
                    .table(Invernaderos::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
