//! Database queries for deploy projects.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::deploy_project::{self as project, ActiveModel, Entity as Project};
use crate::error::{AppError, AppResult};
use crate::models::{CreateProjectRequest, QueryProjectsParams, UpdateProjectRequest};

use super::DbPool;

/// Name of the sentinel project that collects unresolvable-trigger events.
pub const ERROR_PROJECT_NAME: &str = "(ERROR)";

impl DbPool {
    /// Insert a new project.
    pub async fn insert_project(&self, req: &CreateProjectRequest) -> AppResult<project::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(req.name.clone()),
            full_name: Set(req.full_name.clone()),
            script: Set(req.script.clone()),
            script_timeout: Set(req.script_timeout),
            branch: Set(req.branch.clone()),
            site: Set(req.site.clone()),
            site_config_path: Set(req.site_config_path.clone()),
            site_config: Set(req.site_config.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert project: {}", e)))?;

        Ok(result)
    }

    /// Get a project by ID.
    pub async fn get_project_by_id(&self, id: Uuid) -> AppResult<Option<project::Model>> {
        let result = Project::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get project: {}", e)))?;

        Ok(result)
    }

    /// Find a project by repo full name and tracked branch (trigger resolution).
    pub async fn find_project_by_repo(
        &self,
        full_name: &str,
        branch: &str,
    ) -> AppResult<Option<project::Model>> {
        let result = Project::find()
            .filter(project::Column::FullName.eq(full_name))
            .filter(project::Column::Branch.eq(branch))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find project by repo: {}", e)))?;

        Ok(result)
    }

    /// Apply a partial update to a project. `id` is immutable.
    pub async fn update_project(
        &self,
        id: Uuid,
        req: &UpdateProjectRequest,
    ) -> AppResult<project::Model> {
        let existing = self
            .get_project_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {}", id)))?;

        let mut active: ActiveModel = existing.into();
        if let Some(ref name) = req.name {
            active.name = Set(name.clone());
        }
        if let Some(ref full_name) = req.full_name {
            active.full_name = Set(full_name.clone());
        }
        if let Some(ref script) = req.script {
            active.script = Set(script.clone());
        }
        if let Some(timeout) = req.script_timeout {
            active.script_timeout = Set(Some(timeout));
        }
        if let Some(ref branch) = req.branch {
            active.branch = Set(branch.clone());
        }
        if let Some(ref site) = req.site {
            active.site = Set(Some(site.clone()));
        }
        if let Some(ref path) = req.site_config_path {
            active.site_config_path = Set(Some(path.clone()));
        }
        if let Some(ref config) = req.site_config {
            active.site_config = Set(Some(config.clone()));
        }
        active.updated_at = Set(Utc::now());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update project: {}", e)))?;

        Ok(result)
    }

    /// Query projects with filtering and pagination.
    pub async fn query_projects(
        &self,
        query: &QueryProjectsParams,
    ) -> AppResult<(Vec<project::Model>, u64)> {
        let mut select = Project::find();

        // Case-insensitive substring filters, matching the admin UI's behavior
        if let Some(ref name) = query.name {
            select = select.filter(Expr::cust_with_values(
                "deploy_projects.name ILIKE $1",
                [format!("%{}%", name)],
            ));
        }

        if let Some(ref full_name) = query.full_name {
            select = select.filter(Expr::cust_with_values(
                "deploy_projects.full_name ILIKE $1",
                [format!("%{}%", full_name)],
            ));
        }

        // Count total before pagination
        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count projects: {}", e)))?;

        let limit = query.limit.clamp(1, 100) as u64;
        let offset = query.offset.max(0) as u64;

        let projects = select
            .order_by_asc(project::Column::Name)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query projects: {}", e)))?;

        Ok((projects, total))
    }

    /// Get or create the sentinel project that unresolvable-trigger events are
    /// recorded against.
    pub async fn ensure_error_project(&self) -> AppResult<project::Model> {
        let existing = Project::find()
            .filter(project::Column::Name.eq(ERROR_PROJECT_NAME))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find error project: {}", e)))?;

        if let Some(model) = existing {
            return Ok(model);
        }

        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(ERROR_PROJECT_NAME.to_string()),
            full_name: Set(ERROR_PROJECT_NAME.to_string()),
            // Never executed; events against this project are created terminal
            script: Set("true".to_string()),
            script_timeout: Set(None),
            branch: Set("-".to_string()),
            site: Set(None),
            site_config_path: Set(None),
            site_config: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to create error project: {}", e)))?;

        Ok(result)
    }
}
