use sea_orm::entity::prelude::*;

/// Keyed by `(station_id, ocpp_id)`, not an internal connector id — that's
/// the externally visible identity a station actually reports.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "connectors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub station_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub ocpp_id: i32,
    pub state: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::Connector {
    fn from(m: Model) -> Self {
        crate::domain::Connector {
            station_id: m.station_id,
            ocpp_id: m.ocpp_id as u32,
            state: crate::domain::ConnectorState::from_ocpp_status(&m.state),
        }
    }
}

impl From<&crate::domain::Connector> for ActiveModel {
    fn from(c: &crate::domain::Connector) -> Self {
        ActiveModel {
            station_id: sea_orm::ActiveValue::Set(c.station_id),
            ocpp_id: sea_orm::ActiveValue::Set(c.ocpp_id as i32),
            state: sea_orm::ActiveValue::Set(c.state.as_str().to_string()),
        }
    }
}
