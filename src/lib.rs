//! OCPP 1.6J backend gateway.
//!
//! - **protocol**: wire framing, payload shapes, the pending-call
//!   correlation registry, and the per-action handlers.
//! - **transport**: one `StationLink` per live WebSocket connection.
//! - **registry**: the process-wide `stationId -> StationLink` map.
//! - **control**: turns external Start/Stop RPCs into outbound OCPP calls.
//! - **store**: the persistence port and its in-memory/SeaORM adapters.
//! - **server**: boundary adapters — the WebSocket listener, the
//!   control-plane HTTP transport, and graceful shutdown.
//! - **domain**: Station/Connector/Session and their derived quantities.
//! - **config**, **error**: ambient configuration and crate-wide error types.

pub mod config;
pub mod control;
pub mod domain;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod store;
pub mod transport;

pub use config::AppConfig;
pub use control::ControlService;
pub use registry::StationRegistry;
pub use store::Store;
