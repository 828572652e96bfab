use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Station::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Station::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(Station::ChargeBoxId).string().not_null().unique_key())
                    .col(ColumnDef::new(Station::Vendor).string().not_null().default(""))
                    .col(ColumnDef::new(Station::Model).string().not_null().default(""))
                    .col(ColumnDef::new(Station::Serial).string().not_null().default(""))
                    .col(ColumnDef::new(Station::Firmware).string().not_null().default(""))
                    .col(ColumnDef::new(Station::Online).boolean().not_null().default(false))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Station::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Station {
    Table,
    Id,
    ChargeBoxId,
    Vendor,
    Model,
    Serial,
    Firmware,
    Online,
}
