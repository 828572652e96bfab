use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "current_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub station_id: i64,
    pub connector_id: i64,
    pub connector_ocpp_id: i32,
    pub connector_type: String,
    pub connector_power: i32,
    pub user_id: i64,
    pub email: String,
    pub id_tag: String,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub voltage: f32,
    pub current: f32,
    pub power: f32,
    pub soc: i32,
    pub soc_begin: Option<i32>,
    pub soc_end: Option<i32>,
    pub max_power: f32,
    pub charged_energy: f32,
    pub price_limit: f32,
    pub price_per_kwh: f32,
    pub percent_limit: i32,
    pub total_price: f32,
    pub time_left: i64,
    pub was_start_accepted: i32,
    pub was_first_meter_values: bool,
    pub was_start_transaction: bool,
    pub was_stop_transaction: bool,
    pub location_country: String,
    pub location_city: String,
    pub location_street: String,
    pub location_photo_url: Option<String>,
    pub station_serial: String,
    pub owner: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::Session {
    fn from(m: Model) -> Self {
        super::finished_session::row_to_session(
            m.id,
            m.station_id,
            m.connector_id,
            m.connector_ocpp_id,
            m.connector_type,
            m.connector_power,
            m.user_id,
            m.email,
            m.id_tag,
            m.begin,
            m.end,
            m.voltage,
            m.current,
            m.power,
            m.soc,
            m.soc_begin,
            m.soc_end,
            m.max_power,
            m.charged_energy,
            m.price_limit,
            m.price_per_kwh,
            m.percent_limit,
            m.total_price,
            m.time_left,
            m.was_start_accepted,
            m.was_first_meter_values,
            m.was_start_transaction,
            m.was_stop_transaction,
            m.location_country,
            m.location_city,
            m.location_street,
            m.location_photo_url,
            m.station_serial,
            m.owner,
        )
    }
}

impl From<&crate::domain::Session> for ActiveModel {
    fn from(s: &crate::domain::Session) -> Self {
        ActiveModel {
            id: sea_orm::ActiveValue::Set(s.id),
            station_id: sea_orm::ActiveValue::Set(s.station_id),
            connector_id: sea_orm::ActiveValue::Set(s.connector_id),
            connector_ocpp_id: sea_orm::ActiveValue::Set(s.connector_ocpp_id as i32),
            connector_type: sea_orm::ActiveValue::Set(s.connector_type.clone()),
            connector_power: sea_orm::ActiveValue::Set(s.connector_power),
            user_id: sea_orm::ActiveValue::Set(s.user_id),
            email: sea_orm::ActiveValue::Set(s.email.clone()),
            id_tag: sea_orm::ActiveValue::Set(s.id_tag.clone()),
            begin: sea_orm::ActiveValue::Set(s.begin.clone()),
            end: sea_orm::ActiveValue::Set(s.end.clone()),
            voltage: sea_orm::ActiveValue::Set(s.voltage),
            current: sea_orm::ActiveValue::Set(s.current),
            power: sea_orm::ActiveValue::Set(s.power),
            soc: sea_orm::ActiveValue::Set(s.soc),
            soc_begin: sea_orm::ActiveValue::Set(s.soc_begin),
            soc_end: sea_orm::ActiveValue::Set(s.soc_end),
            max_power: sea_orm::ActiveValue::Set(s.max_power),
            charged_energy: sea_orm::ActiveValue::Set(s.charged_energy),
            price_limit: sea_orm::ActiveValue::Set(s.price_limit),
            price_per_kwh: sea_orm::ActiveValue::Set(s.price_per_kwh),
            percent_limit: sea_orm::ActiveValue::Set(s.percent_limit),
            total_price: sea_orm::ActiveValue::Set(s.total_price),
            time_left: sea_orm::ActiveValue::Set(s.time_left),
            was_start_accepted: sea_orm::ActiveValue::Set(s.was_start_accepted),
            was_first_meter_values: sea_orm::ActiveValue::Set(s.was_first_meter_values),
            was_start_transaction: sea_orm::ActiveValue::Set(s.was_start_transaction),
            was_stop_transaction: sea_orm::ActiveValue::Set(s.was_stop_transaction),
            location_country: sea_orm::ActiveValue::Set(s.location_country.clone()),
            location_city: sea_orm::ActiveValue::Set(s.location_city.clone()),
            location_street: sea_orm::ActiveValue::Set(s.location_street.clone()),
            location_photo_url: sea_orm::ActiveValue::Set(s.location_photo_url.clone()),
            station_serial: sea_orm::ActiveValue::Set(s.station_serial.clone()),
            owner: sea_orm::ActiveValue::Set(s.owner.clone()),
        }
    }
}
