//! Control-plane HTTP transport (A5): exposes `CommandService`'s two unary
//! methods over `axum`, with `ControlError` mapped to HTTP 400 and a
//! `{code, error}` body.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::control::ControlService;
use crate::error::ControlError;

#[derive(Clone)]
pub struct ControlState {
    pub control: Arc<ControlService>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    #[validate(range(min = 1, message = "stationId must be positive"))]
    pub station_id: i64,
    #[validate(range(min = 1, message = "sessionId must be positive"))]
    pub session_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StopRequest {
    #[validate(range(min = 1, message = "stationId must be positive"))]
    pub station_id: i64,
    #[validate(range(min = 1, message = "sessionId must be positive"))]
    pub session_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct CustomErrorDetail {
    pub code: String,
    pub error: String,
}

pub fn router(control: Arc<ControlService>) -> Router {
    Router::new()
        .route("/commands/start", post(start))
        .route("/commands/stop", post(stop))
        .layer(TraceLayer::new_for_http())
        .with_state(ControlState { control })
}

async fn start(
    State(state): State<ControlState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    request.validate().map_err(ApiError::validation)?;
    state.control.start(request.station_id, request.session_id).await?;
    Ok(Json(CommandResponse { success: true }))
}

async fn stop(
    State(state): State<ControlState>,
    Json(request): Json<StopRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    request.validate().map_err(ApiError::validation)?;
    state.control.stop(request.station_id, request.session_id).await?;
    Ok(Json(CommandResponse { success: true }))
}

struct ApiError {
    detail: CustomErrorDetail,
}

impl ApiError {
    fn validation(e: validator::ValidationErrors) -> Self {
        Self {
            detail: CustomErrorDetail {
                code: "invalidRequest".to_string(),
                error: e.to_string(),
            },
        }
    }
}

impl From<ControlError> for ApiError {
    fn from(e: ControlError) -> Self {
        Self {
            detail: CustomErrorDetail {
                code: e.code().to_string(),
                error: e.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self.detail)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Station;
    use crate::registry::StationRegistry;
    use crate::store::memory::InMemoryStore;
    use crate::store::Store;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn session(id: i64, station_id: i64) -> crate::domain::Session {
        crate::domain::Session {
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
    async fn start_returns_400_with_code_when_station_not_connected() {
        let registry = Arc::new(StationRegistry::new());
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let control = Arc::new(ControlService::new(registry, store));
        let app = router(control);

        let body = serde_json::to_vec(&serde_json::json!({"stationId": 1, "sessionId": 1})).unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/commands/start")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["code"], "stationNotConnected");
    }

    #[tokio::test]
    async fn start_returns_success_true_on_acceptance() {
        let registry = Arc::new(StationRegistry::new());
        let store = Arc::new(InMemoryStore::new());
        store.seed_station(
            Station {
                id: 9,
                charge_box_id: "CB9".into(),
                vendor: String::new(),
                model: String::new(),
                serial: String::new(),
                firmware: String::new(),
                online: true,
            },
            &[1],
        );
        store.seed_current_session(session(42, 9));

        let (link, mut write_rx) = crate::transport::test_support::test_link_with_writer(9);
        registry.insert(9, link).await;

        let store_dyn: Arc<dyn Store> = store.clone();
        let control = Arc::new(ControlService::new(registry.clone(), store_dyn));
        let app = router(control);

        let body = serde_json::to_vec(&serde_json::json!({"stationId": 9, "sessionId": 42})).unwrap();
        let request_fut = app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/commands/start")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        );

        let handle = tokio::spawn(request_fut);

        let tokio_tungstenite::tungstenite::Message::Text(sent) = write_rx.recv().await.unwrap() else {
            panic!("expected a text frame");
        };
        let crate::protocol::OcppFrame::Call { unique_id, .. } = crate::protocol::OcppFrame::parse(&sent).unwrap()
        else {
            panic!("expected CALL");
        };
        let link = registry.get(9).await.unwrap();
        link.pending.complete(&unique_id, serde_json::json!({"status": "Accepted"})).await.unwrap();

        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["success"], true);
    }
}
