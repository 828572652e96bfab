//! SeaORM `Store` adapter (A3): the concrete persistence backend behind
//! the narrow `Store` port — a thin struct wrapping `DatabaseConnection`,
//! entity lookups via `find_by_id`/`filter`, `ActiveModel`-based writes.

pub mod entities;
pub mod migrator;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::domain::{Connector, Session, Station};
use crate::error::StoreError;

use entities::{connector as connector_entity, current_session, finished_session, station as station_entity};

use super::Store;

pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!(url = %database_url, "connecting to database");
        let db = sea_orm::Database::connect(database_url).await?;
        Ok(Self { db })
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        migrator::Migrator::up(&self.db, None).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for SeaOrmStore {
    async fn get_station_by_id(&self, id: i64) -> Result<Station, StoreError> {
        station_entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Station::from)
            .ok_or_else(|| StoreError::StationNotFound(id.to_string()))
    }

    async fn get_station_by_charge_box_id(&self, charge_box_id: &str) -> Result<Station, StoreError> {
        station_entity::Entity::find()
            .filter(station_entity::Column::ChargeBoxId.eq(charge_box_id))
            .one(&self.db)
            .await?
            .map(Station::from)
            .ok_or_else(|| StoreError::StationNotFound(charge_box_id.to_string()))
    }

    async fn update_station(&self, station: &Station) -> Result<(), StoreError> {
        let model: station_entity::ActiveModel = station.into();
        model.update(&self.db).await.or_else(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => Err(StoreError::StationNotFound(station.id.to_string())),
            other => Err(StoreError::from(other)),
        })?;
        Ok(())
    }

    async fn set_all_stations_offline(&self) -> Result<(), StoreError> {
        let stations = station_entity::Entity::find().all(&self.db).await?;
        for model in stations {
            let mut active: station_entity::ActiveModel = model.into();
            active.online = sea_orm::ActiveValue::Set(false);
            active.update(&self.db).await?;
        }
        Ok(())
    }

    async fn get_connector(&self, station_id: i64, ocpp_id: u32) -> Result<Connector, StoreError> {
        connector_entity::Entity::find()
            .filter(connector_entity::Column::StationId.eq(station_id))
            .filter(connector_entity::Column::OcppId.eq(ocpp_id as i32))
            .one(&self.db)
            .await?
            .map(Connector::from)
            .ok_or_else(|| StoreError::ConnectorNotFound(station_id.to_string(), ocpp_id))
    }

    async fn update_connector(&self, connector: &Connector) -> Result<(), StoreError> {
        use sea_orm::sea_query::OnConflict;

        let model: connector_entity::ActiveModel = connector.into();
        connector_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([connector_entity::Column::StationId, connector_entity::Column::OcppId])
                    .update_column(connector_entity::Column::State)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn get_current_session_by_id(&self, id: i64) -> Result<Session, StoreError> {
        current_session::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Session::from)
            .ok_or(StoreError::SessionNotFound(id))
    }

    async fn get_current_session_by_id_tag(&self, id_tag: &str) -> Result<Option<Session>, StoreError> {
        Ok(current_session::Entity::find()
            .filter(current_session::Column::IdTag.eq(id_tag))
            .one(&self.db)
            .await?
            .map(Session::from))
    }

    async fn get_current_session_by_connector(
        &self,
        station_id: i64,
        ocpp_id: u32,
    ) -> Result<Option<Session>, StoreError> {
        Ok(current_session::Entity::find()
            .filter(current_session::Column::StationId.eq(station_id))
            .filter(current_session::Column::ConnectorOcppId.eq(ocpp_id as i32))
            .one(&self.db)
            .await?
            .map(Session::from))
    }

    async fn update_current_session(&self, session: &Session) -> Result<(), StoreError> {
        use sea_orm::sea_query::OnConflict;

        let model: current_session::ActiveModel = session.into();
        current_session::Entity::insert(model)
            .on_conflict(OnConflict::column(current_session::Column::Id).update_columns(all_session_columns()).to_owned())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_current_session(&self, id: i64) -> Result<(), StoreError> {
        current_session::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn create_finished_session(&self, session: &Session) -> Result<(), StoreError> {
        let model: finished_session::ActiveModel = session.into();
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn get_finished_session_by_id(&self, id: i64) -> Result<Session, StoreError> {
        finished_session::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Session::from)
            .ok_or(StoreError::SessionNotFound(id))
    }

    async fn update_finished_session(&self, session: &Session) -> Result<(), StoreError> {
        let model: finished_session::ActiveModel = session.into();
        model.update(&self.db).await?;
        Ok(())
    }
}

fn all_session_columns() -> Vec<current_session::Column> {
    use current_session::Column::*;
    vec![
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
    ]
}
