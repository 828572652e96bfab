//! Control service (C7): turns the external `Start`/`Stop` RPCs into
//! outbound OCPP calls, routed C6 -> C4 -> C3.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::Session;
use crate::error::ControlError;
use crate::protocol::{
    generate_id_tag, RemoteStartStopStatus, RemoteStartTransactionRequest, RemoteStartTransactionResponse,
    RemoteStopTransactionRequest, RemoteStopTransactionResponse,
};
use crate::registry::StationRegistry;
use crate::store::Store;
use crate::transport::LinkError;

pub struct ControlService {
    registry: Arc<StationRegistry>,
    store: Arc<dyn Store>,
}

impl ControlService {
    pub fn new(registry: Arc<StationRegistry>, store: Arc<dyn Store>) -> Self {
        Self { registry, store }
    }

    /// `Start({stationId, sessionId})`.
    pub async fn start(&self, station_id: i64, session_id: i64) -> Result<(), ControlError> {
        let link = self
            .registry
            .get(station_id)
            .await
            .ok_or(ControlError::StationNotConnected)?;

        let mut session: Session = self.store.get_current_session_by_id(session_id).await?;

        let id_tag = generate_id_tag();
        session.id_tag = id_tag.clone();
        session.begin = Some(Utc::now().to_rfc3339());
        self.store.update_current_session(&session).await?;

        let request = RemoteStartTransactionRequest {
            connector_id: Some(session.connector_ocpp_id),
            id_tag: id_tag.clone(),
            charging_profile: None,
        };
        let payload = serde_json::to_value(&request).map_err(|e| ControlError::SendCommandError(e.to_string()))?;

        let response = link
            .send_request("RemoteStartTransaction", payload)
            .await
            .map_err(map_link_error)?;
        let response: RemoteStartTransactionResponse =
            serde_json::from_value(response).map_err(|e| ControlError::SendCommandError(e.to_string()))?;

        if response.status != RemoteStartStopStatus::Accepted {
            session.was_start_accepted = -1;
            if let Err(e) = self.store.update_current_session(&session).await {
                warn!(session_id, error = %e, "failed to persist rejected remote start");
            }
            return Err(ControlError::CommandWasNotAccepted);
        }

        session.was_start_accepted = 1;
        self.store.update_current_session(&session).await?;
        info!(station_id, session_id, "remote start accepted");
        Ok(())
    }

    /// `Stop({stationId, sessionId /* = transactionId */})`.
    /// No session mutation here — the station follows up with a
    /// `StopTransaction` call the protocol handlers pick up independently.
    pub async fn stop(&self, station_id: i64, transaction_id: i64) -> Result<(), ControlError> {
        let link = self
            .registry
            .get(station_id)
            .await
            .ok_or(ControlError::StationNotConnected)?;

        let request = RemoteStopTransactionRequest {
            transaction_id: transaction_id as i32,
        };
        let payload = serde_json::to_value(&request).map_err(|e| ControlError::SendCommandError(e.to_string()))?;

        let response = link
            .send_request("RemoteStopTransaction", payload)
            .await
            .map_err(map_link_error)?;
        let response: RemoteStopTransactionResponse =
            serde_json::from_value(response).map_err(|e| ControlError::SendCommandError(e.to_string()))?;

        if response.status != RemoteStartStopStatus::Accepted {
            return Err(ControlError::CommandWasNotAccepted);
        }

        info!(station_id, transaction_id, "remote stop accepted");
        Ok(())
    }
}

fn map_link_error(e: LinkError) -> ControlError {
    ControlError::SendCommandError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Station;
    use crate::store::memory::InMemoryStore;
    use crate::transport::test_support::test_link_with_writer;
    use tokio_tungstenite::tungstenite::Message;

    fn session(id: i64, station_id: i64) -> Session {
        Session {
            id,
            station_id,
            connector_id: 1,
            connector_ocpp_id: 1,
            connector_type: "Type2".into(),
            connector_power: 22,
            user_id: 1,
            email: String::new(),
            id_tag: String::new(),
            begin: None,
            end: None,
            voltage: 0.0,
            current: 0.0,
            power: 0.0,
            soc: 0,
            soc_begin: None,
            soc_end: None,
            max_power: 0.0,
            charged_energy: 0.0,
            price_limit: 0.0,
            price_per_kwh: 10.0,
            percent_limit: 0,
            total_price: 0.0,
            time_left: 0,
            was_start_accepted: 0,
            was_first_meter_values: false,
            was_start_transaction: false,
            was_stop_transaction: false,
            location_country: String::new(),
            location_city: String::new(),
            location_street: String::new(),
            location_photo_url: None,
            station_serial: String::new(),
            owner: String::new(),
        }
    }

    #[tokio::test]
    async fn start_fails_fast_when_station_not_connected() {
        let registry = Arc::new(StationRegistry::new());
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let svc = ControlService::new(registry, store);
        let err = svc.start(1, 1).await.unwrap_err();
        assert!(matches!(err, ControlError::StationNotConnected));
    }

    #[tokio::test]
    async fn start_happy_path_marks_accepted_and_generates_id_tag() {
        let registry = Arc::new(StationRegistry::new());
        let store = Arc::new(InMemoryStore::new());
        store.seed_station(
            Station {
                id: 5,
                charge_box_id: "CB5".into(),
                vendor: String::new(),
                model: String::new(),
                serial: String::new(),
                firmware: String::new(),
                online: true,
            },
            &[1],
        );
        store.seed_current_session(session(77, 5));

        let (link, mut write_rx) = test_link_with_writer(5);
        registry.insert(5, link).await;

        let store_dyn: Arc<dyn Store> = store.clone();
        let svc = Arc::new(ControlService::new(registry.clone(), store_dyn));
        let svc2 = svc.clone();
        let handle = tokio::spawn(async move { svc2.start(5, 77).await });

        let Message::Text(sent) = write_rx.recv().await.unwrap() else {
            panic!("expected a text frame");
        };
        let frame = crate::protocol::OcppFrame::parse(&sent).unwrap();
        let crate::protocol::OcppFrame::Call { unique_id, action, payload } = frame else {
            panic!("expected CALL");
        };
        assert_eq!(action, "RemoteStartTransaction");
        assert_eq!(payload["connectorId"], 1);

        let link = registry.get(5).await.unwrap();
        link.pending.complete(&unique_id, serde_json::json!({"status": "Accepted"})).await.unwrap();

        handle.await.unwrap().unwrap();

        let updated = store.get_current_session_by_id(77).await.unwrap();
        assert_eq!(updated.was_start_accepted, 1);
        assert_eq!(updated.id_tag.len(), 10);
    }

    #[tokio::test]
    async fn start_rejected_marks_session_negative_one() {
        let registry = Arc::new(StationRegistry::new());
        let store = Arc::new(InMemoryStore::new());
        store.seed_station(
            Station {
                id: 6,
                charge_box_id: "CB6".into(),
                vendor: String::new(),
                model: String::new(),
                serial: String::new(),
                firmware: String::new(),
                online: true,
            },
            &[1],
        );
        store.seed_current_session(session(78, 6));

        let (link, mut write_rx) = test_link_with_writer(6);
        registry.insert(6, link).await;

        let store_dyn: Arc<dyn Store> = store.clone();
        let svc = Arc::new(ControlService::new(registry.clone(), store_dyn));
        let svc2 = svc.clone();
        let handle = tokio::spawn(async move { svc2.start(6, 78).await });

        let Message::Text(sent) = write_rx.recv().await.unwrap() else {
            panic!("expected a text frame");
        };
        let crate::protocol::OcppFrame::Call { unique_id, .. } =
            crate::protocol::OcppFrame::parse(&sent).unwrap()
        else {
            panic!("expected CALL");
        };

        let link = registry.get(6).await.unwrap();
        link.pending.complete(&unique_id, serde_json::json!({"status": "Rejected"})).await.unwrap();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ControlError::CommandWasNotAccepted));

        let updated = store.get_current_session_by_id(78).await.unwrap();
        assert_eq!(updated.was_start_accepted, -1);
    }
}
