//! Deploy event entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deploy_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    /// Trigger source: 0=unknown, 1=error, 2=github, 3=webhook
    pub event_type: i16,
    /// Lifecycle label: pending, running, success, failed, timedout.
    /// Operators may overwrite with a free-form label via manual correction.
    pub status: String,
    pub status_message: Option<String>,
    /// Short summary, typically the commit message headline
    pub caption: Option<String>,
    /// SHA or ref at trigger time
    #[sea_orm(column_name = "commit_ref")]
    pub commit: Option<String>,
    /// Branch at trigger time; may differ from the project's configured branch
    pub branch: String,
    pub created_at: DateTimeUtc,
    pub started_at: Option<DateTimeUtc>,
    pub finished_at: Option<DateTimeUtc>,
    /// Captured script output, append-only during the run, capped with a
    /// truncation marker past the configured size
    #[sea_orm(column_type = "Text")]
    pub stdout: String,
    #[sea_orm(column_type = "Text")]
    pub stderr: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deploy_project::Entity",
        from = "Column::ProjectId",
        to = "super::deploy_project::Column::Id"
    )]
    Project,
}

impl Related<super::deploy_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
