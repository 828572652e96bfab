//! Migration aggregator: one ordered list of migrations, applied in
//! sequence by `MigratorTrait::up`.

mod m20240101_000001_create_stations;
mod m20240101_000002_create_connectors;
mod m20240101_000003_create_current_sessions;
mod m20240101_000004_create_finished_sessions;

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_stations::Migration),
            Box::new(m20240101_000002_create_connectors::Migration),
            Box::new(m20240101_000003_create_current_sessions::Migration),
            Box::new(m20240101_000004_create_finished_sessions::Migration),
        ]
    }
}
