use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(session_table(CurrentSession::Table).to_owned())
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CurrentSession::Table).to_owned())
            .await
    }
}

/// Column set shared by `current_sessions` and `finished_sessions`: one
/// record shape, two tables distinguished only by which one holds a row.
pub(super) fn session_table(table: impl IntoTableRef) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(CurrentSession::Id).big_integer().not_null().primary_key())
        .col(ColumnDef::new(CurrentSession::StationId).big_integer().not_null())
        .col(ColumnDef::new(CurrentSession::ConnectorId).big_integer().not_null())
        .col(ColumnDef::new(CurrentSession::ConnectorOcppId).integer().not_null())
        .col(ColumnDef::new(CurrentSession::ConnectorType).string().not_null().default(""))
        .col(ColumnDef::new(CurrentSession::ConnectorPower).integer().not_null().default(0))
        .col(ColumnDef::new(CurrentSession::UserId).big_integer().not_null().default(0))
        .col(ColumnDef::new(CurrentSession::Email).string().not_null().default(""))
        .col(ColumnDef::new(CurrentSession::IdTag).string().not_null())
        .col(ColumnDef::new(CurrentSession::Begin).string())
        .col(ColumnDef::new(CurrentSession::End).string())
        .col(ColumnDef::new(CurrentSession::Voltage).float().not_null().default(0.0))
        .col(ColumnDef::new(CurrentSession::Current).float().not_null().default(0.0))
        .col(ColumnDef::new(CurrentSession::Power).float().not_null().default(0.0))
        .col(ColumnDef::new(CurrentSession::Soc).integer().not_null().default(0))
        .col(ColumnDef::new(CurrentSession::SocBegin).integer())
        .col(ColumnDef::new(CurrentSession::SocEnd).integer())
        .col(ColumnDef::new(CurrentSession::MaxPower).float().not_null().default(0.0))
        .col(ColumnDef::new(CurrentSession::ChargedEnergy).float().not_null().default(0.0))
        .col(ColumnDef::new(CurrentSession::PriceLimit).float().not_null().default(0.0))
        .col(ColumnDef::new(CurrentSession::PricePerKwh).float().not_null().default(0.0))
        .col(ColumnDef::new(CurrentSession::PercentLimit).integer().not_null().default(0))
        .col(ColumnDef::new(CurrentSession::TotalPrice).float().not_null().default(0.0))
        .col(ColumnDef::new(CurrentSession::TimeLeft).big_integer().not_null().default(0))
        .col(ColumnDef::new(CurrentSession::WasStartAccepted).integer().not_null().default(0))
        .col(ColumnDef::new(CurrentSession::WasFirstMeterValues).boolean().not_null().default(false))
        .col(ColumnDef::new(CurrentSession::WasStartTransaction).boolean().not_null().default(false))
        .col(ColumnDef::new(CurrentSession::WasStopTransaction).boolean().not_null().default(false))
        .col(ColumnDef::new(CurrentSession::LocationCountry).string().not_null().default(""))
        .col(ColumnDef::new(CurrentSession::LocationCity).string().not_null().default(""))
        .col(ColumnDef::new(CurrentSession::LocationStreet).string().not_null().default(""))
        .col(ColumnDef::new(CurrentSession::LocationPhotoUrl).string())
        .col(ColumnDef::new(CurrentSession::StationSerial).string().not_null().default(""))
        .col(ColumnDef::new(CurrentSession::Owner).string().not_null().default(""))
        .to_owned()
}

#[derive(DeriveIden)]
pub(super) enum CurrentSession {
    Table,
    Id,
    StationId,
    ConnectorId,
    ConnectorOcppId,
    ConnectorType,
    ConnectorPower,
    UserId,
    Email,
    IdTag,
    Begin,
    End,
    Voltage,
    Current,
    Power,
    Soc,
    SocBegin,
    SocEnd,
    MaxPower,
    ChargedEnergy,
    PriceLimit,
    PricePerKwh,
    PercentLimit,
    TotalPrice,
    TimeLeft,
    WasStartAccepted,
    WasFirstMeterValues,
    WasStartTransaction,
    WasStopTransaction,
    LocationCountry,
    LocationCity,
    LocationStreet,
    LocationPhotoUrl,
    StationSerial,
    Owner,
}
