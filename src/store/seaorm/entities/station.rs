use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub charge_box_id: String,
    pub vendor: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
    pub online: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::domain::Station {
    fn from(m: Model) -> Self {
        crate::domain::Station {
            id: m.id,
            charge_box_id: m.charge_box_id,
            vendor: m.vendor,
            model: m.model,
            serial: m.serial,
            firmware: m.firmware,
            online: m.online,
        }
    }
}

impl From<&crate::domain::Station> for ActiveModel {
    fn from(s: &crate::domain::Station) -> Self {
        ActiveModel {
            id: sea_orm::ActiveValue::Set(s.id),
            charge_box_id: sea_orm::ActiveValue::Set(s.charge_box_id.clone()),
            vendor: sea_orm::ActiveValue::Set(s.vendor.clone()),
            model: sea_orm::ActiveValue::Set(s.model.clone()),
            serial: sea_orm::ActiveValue::Set(s.serial.clone()),
            firmware: sea_orm::ActiveValue::Set(s.firmware.clone()),
            online: sea_orm::ActiveValue::Set(s.online),
        }
    }
}
