//! Migration: Create deploy_projects table.
//!
//! A deploy project is a configured repo+branch+script+site deployment target.

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
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE deploy_projects (
                    id UUID PRIMARY KEY,
                    name VARCHAR(255) NOT NULL CHECK (name <> ''),
                    full_name VARCHAR(255) NOT NULL CHECK (full_name <> ''),
                    script TEXT NOT NULL CHECK (script <> ''),

                    -- Seconds of wall-clock runtime; NULL or 0 disables the timeout
                    script_timeout INTEGER CHECK (script_timeout IS NULL OR script_timeout >= 0),

                    branch VARCHAR(255) NOT NULL CHECK (branch <> ''),

                    -- Deployment target (optional)
                    site VARCHAR(255),
                    site_config_path VARCHAR(500),
                    site_config TEXT,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Trigger resolution looks projects up by repo and branch
                CREATE INDEX idx_deploy_projects_full_name_branch ON deploy_projects(full_name, branch);

                -- Admin list filters are substring matches on name and full_name
                CREATE INDEX idx_deploy_projects_name ON deploy_projects(name);

                CREATE TRIGGER update_deploy_projects_updated_at
                    BEFORE UPDATE ON deploy_projects
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
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
                DROP TRIGGER IF EXISTS update_deploy_projects_updated_at ON deploy_projects;
                DROP TABLE IF EXISTS deploy_projects CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
