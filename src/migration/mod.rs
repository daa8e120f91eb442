//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260702_000001_create_deploy_projects;
mod m20260702_000002_create_deploy_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260702_000001_create_deploy_projects::Migration),
            Box::new(m20260702_000002_create_deploy_events::Migration),
        ]
    }
}
