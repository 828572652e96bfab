//! WebSocket listener (A4): accepts station connections at
//! `GET /ws/<chargeBoxId>`, resolves the station, and hands accepted
//! connections off to the station connection engine (C4).
//!
//! The handshake callback can't await a store lookup, so the upgrade itself
//! always succeeds once a subprotocol match is found; the station lookup
//! runs immediately after, and an unresolved chargeBoxId gets an immediate
//! close frame rather than a literal HTTP 404 — see DESIGN.md.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

use crate::protocol::OCPP_SUBPROTOCOL;
use crate::registry::StationRegistry;
use crate::store::Store;
use crate::transport::run_link;

use super::shutdown::ShutdownSignal;

pub struct WsListenerConfig {
    pub bind_addr: String,
    pub utc_offset_hours: i64,
    pub command_timeout: Duration,
}

pub async fn run_ws_listener(
    config: WsListenerConfig,
    store: Arc<dyn Store>,
    registry: Arc<StationRegistry>,
    shutdown: ShutdownSignal,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "OCPP WebSocket listener started");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => spawn_connection(stream, addr, &config, store.clone(), registry.clone()),
                    Err(e) => error!(error = %e, "failed to accept TCP connection"),
                }
            }
            _ = shutdown.wait() => {
                info!("WebSocket listener stopping: shutdown signal received");
                return Ok(());
            }
        }
    }
}

fn spawn_connection(
    stream: TcpStream,
    addr: SocketAddr,
    config: &WsListenerConfig,
    store: Arc<dyn Store>,
    registry: Arc<StationRegistry>,
) {
    let utc_offset_hours = config.utc_offset_hours;
    let command_timeout = config.command_timeout;

    tokio::spawn(async move {
        if let Err(e) = accept_and_run(stream, addr, store, registry, utc_offset_hours, command_timeout).await {
            warn!(%addr, error = %e, "station connection ended with an error");
        }
    });
}

async fn accept_and_run(
    stream: TcpStream,
    addr: SocketAddr,
    store: Arc<dyn Store>,
    registry: Arc<StationRegistry>,
    utc_offset_hours: i64,
    command_timeout: Duration,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut charge_box_id: Option<String> = None;

    let ws_stream = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, mut response: Response| {
        let path = req.uri().path();
        charge_box_id = extract_charge_box_id(path);

        let requested = req
            .headers()
            .get("Sec-WebSocket-Protocol")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if requested.split(',').map(str::trim).any(|p| p == OCPP_SUBPROTOCOL) {
            response
                .headers_mut()
                .insert("Sec-WebSocket-Protocol", OCPP_SUBPROTOCOL.parse().unwrap());
        }

        Ok(response)
    })
    .await?;

    let Some(charge_box_id) = charge_box_id else {
        warn!(%addr, "upgrade request carried no chargeBoxId, closing");
        return close_with_status(ws_stream, StatusCode::NOT_FOUND).await;
    };

    let station = match store.get_station_by_charge_box_id(&charge_box_id).await {
        Ok(station) => station,
        Err(e) => {
            warn!(%addr, %charge_box_id, error = %e, "unknown station, closing");
            return close_with_status(ws_stream, StatusCode::NOT_FOUND).await;
        }
    };

    info!(%addr, station_id = station.id, %charge_box_id, "station connected");

    run_link(ws_stream, station, store, registry, utc_offset_hours, command_timeout).await;
    Ok(())
}

async fn close_with_status(
    mut ws_stream: tokio_tungstenite::WebSocketStream<TcpStream>,
    _status: StatusCode,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use futures_util::SinkExt;
    let _ = ws_stream.send(Message::Close(None)).await;
    let _ = ws_stream.close(None).await;
    Ok(())
}

/// `/ws/<chargeBoxId>`.
fn extract_charge_box_id(path: &str) -> Option<String> {
    let path = path.trim_start_matches('/');
    let id = path.strip_prefix("ws/")?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_charge_box_id_from_path() {
        assert_eq!(extract_charge_box_id("/ws/CB-123"), Some("CB-123".to_string()));
        assert_eq!(extract_charge_box_id("ws/CB-123"), Some("CB-123".to_string()));
    }

    #[test]
    fn rejects_paths_without_the_ws_prefix() {
        assert_eq!(extract_charge_box_id("/CB-123"), None);
        assert_eq!(extract_charge_box_id("/ws/"), None);
        assert_eq!(extract_charge_box_id("/"), None);
    }
}
