//! Deploy project DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::deploy_project;

/// Request to create a deploy project.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Repo short name.
    pub name: String,
    /// Repo in "owner/repo" format.
    pub full_name: String,
    /// Deploy command, run via /bin/sh -c.
    pub script: String,
    /// Wall-clock limit in seconds; 0 or absent means no timeout.
    #[serde(default)]
    pub script_timeout: Option<i32>,
    /// Tracked branch.
    pub branch: String,
    /// Deployment target identifier.
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub site_config_path: Option<String>,
    #[serde(default)]
    pub site_config: Option<String>,
}

/// Request to update a deploy project. All fields optional; `id` is immutable.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub script_timeout: Option<i32>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub site_config_path: Option<String>,
    #[serde(default)]
    pub site_config: Option<String>,
}

/// Deploy project response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub full_name: String,
    pub script: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_timeout: Option<i32>,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_config: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<deploy_project::Model> for ProjectResponse {
    fn from(m: deploy_project::Model) -> Self {
        ProjectResponse {
            id: m.id,
            name: m.name,
            full_name: m.full_name,
            script: m.script,
            script_timeout: m.script_timeout,
            branch: m.branch,
            site: m.site,
            site_config_path: m.site_config_path,
            site_config: m.site_config,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Project list response with pagination.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectResponse>,
    pub total: i64,
    pub limit: i32,
    pub offset: i32,
}

/// Query parameters for listing projects.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QueryProjectsParams {
    /// Substring filter on repo short name (case-insensitive).
    #[serde(default)]
    pub name: Option<String>,
    /// Substring filter on "owner/repo" (case-insensitive).
    #[serde(default)]
    pub full_name: Option<String>,
    /// Maximum results to return.
    #[serde(default = "default_limit")]
    pub limit: i32,
    /// Offset for pagination.
    #[serde(default)]
    pub offset: i32,
}

fn default_limit() -> i32 {
    50
}
