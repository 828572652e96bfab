//! Station connection (C4): one `StationLink` per live WebSocket, owning
//! the read loop, the serialized writer, inbound dispatch, and outbound
//! server-initiated calls.
//!
//! The writer is a single spawned task draining an unbounded channel — a
//! single writer with an inbox gives the serialized-write guarantee a
//! socket-write mutex would, without holding a lock across an await.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::domain::Station;
use crate::protocol::{dispatch_call, generate_unique_id, DispatchError, HandlerContext, OcppFrame, PendingCallError, PendingCalls};
use crate::registry::StationRegistry;
use crate::store::Store;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link is closed")]
    Closed,
    #[error(transparent)]
    Pending(#[from] PendingCallError),
}

/// One live station connection. Cheap to clone-by-`Arc`; shared between the
/// reader loop (owns it) and any control-plane task issuing outbound calls.
pub struct StationLink {
    pub station_id: i64,
    pub charge_box_id: String,
    write_tx: mpsc::UnboundedSender<Message>,
    pub(crate) pending: PendingCalls,
}

impl StationLink {
    fn new(
        station_id: i64,
        charge_box_id: String,
        write_tx: mpsc::UnboundedSender<Message>,
        command_timeout: Duration,
    ) -> Self {
        Self {
            station_id,
            charge_box_id,
            write_tx,
            pending: PendingCalls::with_timeout(command_timeout),
        }
    }

    /// Outbound CALL: allocate a fresh `uniqueId`, register an awaiter,
    /// write the frame, then block for a reply or the
    /// configured timeout.
    pub async fn send_request(&self, action: &str, payload: Value) -> Result<Value, LinkError> {
        let unique_id = generate_unique_id();
        let frame = OcppFrame::Call {
            unique_id: unique_id.clone(),
            action: action.to_string(),
            payload,
        };
        self.write(frame)?;
        self.pending.call(unique_id).await.map_err(LinkError::from)
    }

    fn write(&self, frame: OcppFrame) -> Result<(), LinkError> {
        self.write_tx
            .send(Message::Text(frame.serialize()))
            .map_err(|_| LinkError::Closed)
    }

    async fn reply_call_result(&self, unique_id: String, payload: Value) {
        if self.write(OcppFrame::CallResult { unique_id, payload }).is_err() {
            debug!(station_id = self.station_id, "link closed before CALLRESULT could be sent");
        }
    }
}

/// Run one station connection to completion: registers in `registry`,
/// reads frames until the socket closes or errors, dispatches CALLs and
/// routes CALLRESULT/CALLERROR frames back to `send_request` callers, then
/// tears down.
pub async fn run_link<S>(
    ws_stream: S,
    station: Station,
    store: Arc<dyn Store>,
    registry: Arc<StationRegistry>,
    utc_offset_hours: i64,
    command_timeout: Duration,
) where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin
        + Send
        + 'static,
{
    let (mut sink, mut stream) = ws_stream.split();
    let (write_tx, mut write_rx) = mpsc::unbounded_channel::<Message>();

    let link = Arc::new(StationLink::new(
        station.id,
        station.charge_box_id.clone(),
        write_tx,
        command_timeout,
    ));

    registry.insert(station.id, link.clone()).await;
    info!(station_id = station.id, charge_box_id = %station.charge_box_id, "station link established");

    let writer_task = tokio::spawn(async move {
        while let Some(msg) = write_rx.recv().await {
            if let Err(e) = sink.send(msg).await {
                warn!(error = %e, "station write failed, closing link");
                break;
            }
        }
        let _ = sink.close().await;
    });

    let ctx = HandlerContext {
        store: store.clone(),
        station_id: station.id,
        utc_offset_hours,
    };

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => handle_text_frame(&link, &ctx, &text).await,
            Ok(Message::Close(_)) => {
                info!(station_id = station.id, "station sent close frame");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Binary(_)) | Ok(Message::Frame(_)) => {}
            Err(e) => {
                warn!(station_id = station.id, error = %e, "websocket read error, closing link");
                break;
            }
        }
    }

    // Tier-3 teardown: deregister, fail outstanding awaiters, close.
    registry.remove_if_current(station.id, &link).await;
    link.pending.cancel_all().await;
    drop(link);
    writer_task.abort();

    if let Ok(mut s) = store.get_station_by_id(station.id).await {
        s.online = false;
        if let Err(e) = store.update_station(&s).await {
            warn!(station_id = station.id, error = %e, "failed to mark station offline on disconnect");
        }
    }

    info!(station_id = station.id, "station link closed");
}

async fn handle_text_frame(link: &Arc<StationLink>, ctx: &HandlerContext, text: &str) {
    match OcppFrame::parse(text) {
        Ok(OcppFrame::Call { unique_id, action, payload }) => match dispatch_call(ctx, &action, payload).await {
            Ok(response) => link.reply_call_result(unique_id, response).await,
            Err(DispatchError::UnknownAction(action)) => {
                warn!(station_id = ctx.station_id, action = %action, "unknown action, dropping frame");
            }
            Err(DispatchError::MalformedPayload { action, source }) => {
                warn!(station_id = ctx.station_id, action = %action, error = %source, "malformed payload, dropping frame");
            }
        },
        Ok(OcppFrame::CallResult { unique_id, payload }) => {
            if let Err(e) = link.pending.complete(&unique_id, payload).await {
                warn!(station_id = ctx.station_id, unique_id = %unique_id, error = %e, "unmatched CALLRESULT");
            }
        }
        Ok(OcppFrame::CallError {
            unique_id,
            error_code,
            error_description,
            ..
        }) => {
            if let Err(e) = link.pending.fail(&unique_id, error_code, error_description).await {
                warn!(station_id = ctx.station_id, unique_id = %unique_id, error = %e, "unmatched CALLERROR");
            }
        }
        Err(e) => {
            warn!(station_id = ctx.station_id, error = %e, "malformed frame, dropping");
        }
    }
}
