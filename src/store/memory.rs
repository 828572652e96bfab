//! In-memory `Store` adapter: DashMap-backed fields and atomic id counters,
//! used by tests and anywhere a real database isn't available.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::Store;
use crate::domain::{Connector, Session, Station};
use crate::error::StoreError;

pub struct InMemoryStore {
    stations_by_id: DashMap<i64, Station>,
    stations_by_charge_box_id: DashMap<String, i64>,
    connectors: DashMap<(i64, u32), Connector>,
    current_sessions: DashMap<i64, Session>,
    finished_sessions: DashMap<i64, Session>,
    next_station_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            stations_by_id: DashMap::new(),
            stations_by_charge_box_id: DashMap::new(),
            connectors: DashMap::new(),
            current_sessions: DashMap::new(),
            finished_sessions: DashMap::new(),
            next_station_id: AtomicI64::new(1),
        }
    }

    /// Seed a station (and its connectors) out-of-band, the way the real
    /// fleet-management system provisions one before it ever connects.
    pub fn seed_station(&self, mut station: Station, connector_ocpp_ids: &[u32]) -> Station {
        if station.id == 0 {
            station.id = self.next_station_id.fetch_add(1, Ordering::SeqCst);
        }
        self.stations_by_charge_box_id
            .insert(station.charge_box_id.clone(), station.id);
        for &ocpp_id in connector_ocpp_ids {
            self.connectors.insert(
                (station.id, ocpp_id),
                Connector {
                    station_id: station.id,
                    ocpp_id,
                    state: crate::domain::ConnectorState::Available,
                },
            );
        }
        self.stations_by_id.insert(station.id, station.clone());
        station
    }

    /// Seed a current session directly — used by the control plane to
    /// reserve a session ahead of a remote start, and by tests.
    pub fn seed_current_session(&self, session: Session) {
        self.current_sessions.insert(session.id, session);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_station_by_id(&self, id: i64) -> Result<Station, StoreError> {
        self.stations_by_id
            .get(&id)
            .map(|s| s.clone())
            .ok_or_else(|| StoreError::StationNotFound(id.to_string()))
    }

    async fn get_station_by_charge_box_id(&self, charge_box_id: &str) -> Result<Station, StoreError> {
        let id = *self
            .stations_by_charge_box_id
            .get(charge_box_id)
            .ok_or_else(|| StoreError::StationNotFound(charge_box_id.to_string()))?;
        self.get_station_by_id(id).await
    }

    async fn update_station(&self, station: &Station) -> Result<(), StoreError> {
        self.stations_by_charge_box_id
            .insert(station.charge_box_id.clone(), station.id);
        self.stations_by_id.insert(station.id, station.clone());
        Ok(())
    }

    async fn set_all_stations_offline(&self) -> Result<(), StoreError> {
        for mut entry in self.stations_by_id.iter_mut() {
            entry.online = false;
        }
        Ok(())
    }

    async fn get_connector(&self, station_id: i64, ocpp_id: u32) -> Result<Connector, StoreError> {
        self.connectors
            .get(&(station_id, ocpp_id))
            .map(|c| c.clone())
            .ok_or(StoreError::ConnectorNotFound(station_id.to_string(), ocpp_id))
    }

    async fn update_connector(&self, connector: &Connector) -> Result<(), StoreError> {
        self.connectors
            .insert((connector.station_id, connector.ocpp_id), connector.clone());
        Ok(())
    }

    async fn get_current_session_by_id(&self, id: i64) -> Result<Session, StoreError> {
        self.current_sessions
            .get(&id)
            .map(|s| s.clone())
            .ok_or(StoreError::SessionNotFound(id))
    }

    async fn get_current_session_by_id_tag(&self, id_tag: &str) -> Result<Option<Session>, StoreError> {
        Ok(self
            .current_sessions
            .iter()
            .find(|s| s.id_tag == id_tag)
            .map(|s| s.clone()))
    }

    async fn get_current_session_by_connector(
        &self,
        station_id: i64,
        ocpp_id: u32,
    ) -> Result<Option<Session>, StoreError> {
        Ok(self
            .current_sessions
            .iter()
            .find(|s| s.station_id == station_id && s.connector_ocpp_id == ocpp_id)
            .map(|s| s.clone()))
    }

    async fn update_current_session(&self, session: &Session) -> Result<(), StoreError> {
        self.current_sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn delete_current_session(&self, id: i64) -> Result<(), StoreError> {
        self.current_sessions
            .remove(&id)
            .ok_or(StoreError::SessionNotFound(id))?;
        Ok(())
    }

    async fn create_finished_session(&self, session: &Session) -> Result<(), StoreError> {
        self.finished_sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_finished_session_by_id(&self, id: i64) -> Result<Session, StoreError> {
        self.finished_sessions
            .get(&id)
            .map(|s| s.clone())
            .ok_or(StoreError::SessionNotFound(id))
    }

    async fn update_finished_session(&self, session: &Session) -> Result<(), StoreError> {
        if !self.finished_sessions.contains_key(&session.id) {
            return Err(StoreError::SessionNotFound(session.id));
        }
        self.finished_sessions.insert(session.id, session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectorState;

    fn station(charge_box_id: &str) -> Station {
        Station {
            id: 0,
            charge_box_id: charge_box_id.to_string(),
            vendor: String::new(),
            model: String::new(),
            serial: String::new(),
            firmware: String::new(),
            online: false,
        }
    }

    #[tokio::test]
    async fn round_trips_a_station_by_charge_box_id() {
        let store = InMemoryStore::new();
        let seeded = store.seed_station(station("CB-1"), &[1, 2]);
        let found = store.get_station_by_charge_box_id("CB-1").await.unwrap();
        assert_eq!(found.id, seeded.id);
        let connector = store.get_connector(seeded.id, 1).await.unwrap();
        assert_eq!(connector.state, ConnectorState::Available);
    }

    #[tokio::test]
    async fn unknown_station_is_an_error() {
        let store = InMemoryStore::new();
        let err = store.get_station_by_charge_box_id("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::StationNotFound(_)));
    }

    #[tokio::test]
    async fn set_all_offline_clears_every_station() {
        let store = InMemoryStore::new();
        let mut s = station("CB-2");
        s.online = true;
        let s = store.seed_station(s, &[]);
        store.set_all_stations_offline().await.unwrap();
        assert!(!store.get_station_by_id(s.id).await.unwrap().online);
    }
}
