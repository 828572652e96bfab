//! The `Store` port (C1): the narrow persistence interface the protocol
//! handlers and control service depend on. Concrete adapters:
//! [`memory::InMemoryStore`] (used in tests and for running without a
//! database) and [`seaorm::SeaOrmStore`] (Postgres via SeaORM).

pub mod memory;
pub mod seaorm;

use async_trait::async_trait;

use crate::domain::{Connector, Session, Station};
use crate::error::StoreError;

/// Persistence port consumed by the protocol handlers (C5) and the control
/// service (C7).
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_station_by_id(&self, id: i64) -> Result<Station, StoreError>;
    async fn get_station_by_charge_box_id(&self, charge_box_id: &str) -> Result<Station, StoreError>;
    async fn update_station(&self, station: &Station) -> Result<(), StoreError>;
    /// Called once at startup so that stale "online" flags from a previous
    /// run do not claim phantom stations.
    async fn set_all_stations_offline(&self) -> Result<(), StoreError>;

    async fn get_connector(&self, station_id: i64, ocpp_id: u32) -> Result<Connector, StoreError>;
    async fn update_connector(&self, connector: &Connector) -> Result<(), StoreError>;

    async fn get_current_session_by_id(&self, id: i64) -> Result<Session, StoreError>;
    async fn get_current_session_by_id_tag(&self, id_tag: &str) -> Result<Option<Session>, StoreError>;
    async fn get_current_session_by_connector(
        &self,
        station_id: i64,
        ocpp_id: u32,
    ) -> Result<Option<Session>, StoreError>;
    async fn update_current_session(&self, session: &Session) -> Result<(), StoreError>;
    async fn delete_current_session(&self, id: i64) -> Result<(), StoreError>;

    async fn create_finished_session(&self, session: &Session) -> Result<(), StoreError>;
    async fn get_finished_session_by_id(&self, id: i64) -> Result<Session, StoreError>;
    async fn update_finished_session(&self, session: &Session) -> Result<(), StoreError>;
}

/// Move a session from the current table to the finished table in one
/// logical step: create the finished row, then delete the current one.
/// Shared by the `StatusNotification` auto-finish rule and any future
/// caller that needs the same handoff.
pub async fn finish_session(store: &dyn Store, session: &Session) -> Result<(), StoreError> {
    store.create_finished_session(session).await?;
    store.delete_current_session(session.id).await
}
