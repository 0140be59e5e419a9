pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_laboratories;
mod m20261001_000002_create_computers;
mod m20261001_000003_create_computer_parts;
mod m20261001_000004_create_reports;
mod m20261001_000005_create_technician_logs;
mod m20261001_000006_create_users;
mod m20261001_000007_create_accessories;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_laboratories::Migration),
            Box::new(m20261001_000002_create_computers::Migration),
            Box::new(m20261001_000003_create_computer_parts::Migration),
            Box::new(m20261001_000004_create_reports::Migration),
            Box::new(m20261001_000005_create_technician_logs::Migration),
            Box::new(m20261001_000006_create_users::Migration),
            Box::new(m20261001_000007_create_accessories::Migration),
        ]
    }
}
