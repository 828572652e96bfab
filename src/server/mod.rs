//! Boundary adapters (A4-A6): the WebSocket listener, the control-plane
//! HTTP transport, and graceful shutdown — none of it touched by the core
//! protocol/engine modules above.

pub mod http;
pub mod shutdown;
pub mod ws;

pub use shutdown::{listen_for_os_signals, ShutdownSignal};
pub use ws::{run_ws_listener, WsListenerConfig};
