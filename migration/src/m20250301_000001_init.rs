use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Table and column names match databases written by the first
        // dashboard releases, so an existing file is adopted as-is.

        // ========== GREENHOUSES ==========
        manager
            .create_table(
                Table::create()
                    .table(Invernaderos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invernaderos::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invernaderos::Nombre).text().not_null())
                    .to_owned(),
            )
            .await?;

        // ========== READINGS ==========
        manager
            .create_table(
                Table::create()
                    .table(Registros::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Registros::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Registros::InvId).integer().not_null())
                    .col(ColumnDef::new(Registros::Fecha).text().not_null())
                    .col(ColumnDef::new(Registros::Hora).text())
                    .col(ColumnDef::new(Registros::TMax).double().not_null())
                    .col(ColumnDef::new(Registros::TMin).double().not_null())
                    .col(ColumnDef::new(Registros::HMax).double().not_null())
                    .col(ColumnDef::new(Registros::HMin).double().not_null())
                    .col(ColumnDef::new(Registros::Co2).double())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_registros_invernadero")
                            .from(Registros::Table, Registros::InvId)
                            .to(Invernaderos::Table, Invernaderos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_registros_inv_fecha")
                    .table(Registros::Table)
                    .col(Registros::InvId)
                    .col(Registros::Fecha)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Registros::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invernaderos::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Invernaderos {
    Table,
    Id,
    Nombre,
}

#[derive(DeriveIden)]
pub(crate) enum Registros {
    Table,
    Id,
    InvId,
    Fecha,
    Hora,
    TMax,
    TMin,
    HMax,
    HMin,
    Co2,
}
