//! SeaORM entity definitions for PostgreSQL database.

pub mod deploy_event;
pub mod deploy_project;
