use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_current_sessions::session_table;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(session_table(FinishedSession::Table).to_owned())
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinishedSession::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FinishedSession {
    Table,
}
