//! Deploy project entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deploy_projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Repo short name
    pub name: String,
    /// owner/repo
    pub full_name: String,
    /// Deploy command, run via /bin/sh -c
    #[sea_orm(column_type = "Text")]
    pub script: String,
    /// Wall-clock limit in seconds; NULL or 0 means no timeout
    pub script_timeout: Option<i32>,
    /// Tracked branch
    pub branch: String,
    /// Deployment target identifier
    pub site: Option<String>,
    pub site_config_path: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub site_config: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::deploy_event::Entity")]
    Events,
}

impl Related<super::deploy_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
