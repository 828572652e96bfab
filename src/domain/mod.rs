//! Domain model: the shapes persisted behind the [`crate::store::Store`] port.

mod connector;
mod session;
mod station;

pub use connector::{Connector, ConnectorState};
pub use session::{format_persisted_timestamp, parse_persisted_timestamp, Session};
pub use station::Station;
