use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Connector::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Connector::StationId).big_integer().not_null())
                    .col(ColumnDef::new(Connector::OcppId).integer().not_null())
                    .col(ColumnDef::new(Connector::State).string().not_null().default("available"))
                    .primary_key(
                        Index::create()
                            .col(Connector::StationId)
                            .col(Connector::OcppId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Connector::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Connector {
    Table,
    StationId,
    OcppId,
    State,
}
