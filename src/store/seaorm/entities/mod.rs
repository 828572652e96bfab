//! SeaORM entities, one table per domain record: `stations`, `connectors`,
//! `current_sessions`, `finished_sessions`, each a `DeriveEntityModel`
//! struct paired with `From` conversions to and from its domain type.

pub mod connector;
pub mod current_session;
pub mod finished_session;
pub mod station;
