//! Migration: Create deploy_events table.
//!
//! One row per execution attempt/record of a deploy for a project.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE deploy_events (
                    id UUID PRIMARY KEY, -- UUIDv7 for time-ordered sorting
                    project_id UUID NOT NULL REFERENCES deploy_projects(id),

                    -- Trigger source: 0=unknown, 1=error, 2=github, 3=webhook
                    event_type SMALLINT NOT NULL DEFAULT 0
                        CHECK (event_type BETWEEN 0 AND 3),

                    -- Executor-written labels are pending/running/success/failed/timedout;
                    -- operators may overwrite via manual correction, so no CHECK here
                    status VARCHAR(64) NOT NULL DEFAULT 'pending',
                    status_message TEXT,

                    caption VARCHAR(500),
                    commit_ref VARCHAR(255),
                    branch VARCHAR(255) NOT NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    started_at TIMESTAMPTZ,
                    finished_at TIMESTAMPTZ,

                    -- Captured script output, capped by the executor
                    stdout TEXT NOT NULL DEFAULT '',
                    stderr TEXT NOT NULL DEFAULT ''
                );

                -- Event lists are filtered by project and sorted newest-first
                CREATE INDEX idx_deploy_events_project_id ON deploy_events(project_id);
                CREATE INDEX idx_deploy_events_created_at ON deploy_events(created_at DESC);
                CREATE INDEX idx_deploy_events_status ON deploy_events(status);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TABLE IF EXISTS deploy_events CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
