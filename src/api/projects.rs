//! Deploy project API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateProjectRequest, ProjectListResponse, ProjectResponse, QueryProjectsParams,
    UpdateProjectRequest,
};

/// Reject empty required fields before anything is persisted.
fn require_non_empty(field: &'static str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn validate_timeout(timeout: Option<i32>) -> AppResult<()> {
    if let Some(timeout) = timeout
        && timeout < 0
    {
        return Err(AppError::Validation(
            "script_timeout must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_create(req: &CreateProjectRequest) -> AppResult<()> {
    require_non_empty("name", &req.name)?;
    require_non_empty("full_name", &req.full_name)?;
    require_non_empty("script", &req.script)?;
    require_non_empty("branch", &req.branch)?;
    validate_timeout(req.script_timeout)
}

fn validate_update(req: &UpdateProjectRequest) -> AppResult<()> {
    if let Some(ref name) = req.name {
        require_non_empty("name", name)?;
    }
    if let Some(ref full_name) = req.full_name {
        require_non_empty("full_name", full_name)?;
    }
    if let Some(ref script) = req.script {
        require_non_empty("script", script)?;
    }
    if let Some(ref branch) = req.branch {
        require_non_empty("branch", branch)?;
    }
    validate_timeout(req.script_timeout)
}

/// Create a deploy project.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_project(
    pool: web::Data<DbPool>,
    body: web::Json<CreateProjectRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_create(&req)?;

    let project = pool.insert_project(&req).await?;

    info!(
        project_id = %project.id,
        name = %project.name,
        full_name = %project.full_name,
        "project created"
    );

    Ok(HttpResponse::Created().json(ProjectResponse::from(project)))
}

/// Query projects with filtering and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    params(
        ("name" = Option<String>, Query, description = "Filter by repo short name (substring, case-insensitive)"),
        ("full_name" = Option<String>, Query, description = "Filter by owner/repo (substring, case-insensitive)"),
        ("limit" = Option<i32>, Query, description = "Results per page (default 50, max 100)"),
        ("offset" = Option<i32>, Query, description = "Pagination offset")
    ),
    responses(
        (status = 200, description = "List of projects", body = ProjectListResponse),
    )
)]
pub async fn list_projects(
    pool: web::Data<DbPool>,
    query: web::Query<QueryProjectsParams>,
) -> AppResult<HttpResponse> {
    let params = query.into_inner();
    let (projects, total) = pool.query_projects(&params).await?;

    let response = ProjectListResponse {
        projects: projects.into_iter().map(ProjectResponse::from).collect(),
        total: total as i64,
        limit: params.limit,
        offset: params.offset,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Get a single project by ID.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "Project UUID")
    ),
    responses(
        (status = 200, description = "Project details", body = ProjectResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_project(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let project = pool
        .get_project_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {}", id)))?;

    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

/// Update a project. `id` is immutable after creation.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "Project UUID")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_project(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProjectRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();
    validate_update(&req)?;

    let project = pool.update_project(id, &req).await?;

    info!(project_id = %project.id, name = %project.name, "project updated");

    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

/// Configure project routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects")
            .route(web::get().to(list_projects))
            .route(web::post().to(create_project)),
    )
    .service(
        web::resource("/projects/{id}")
            .route(web::get().to(get_project))
            .route(web::put().to(update_project)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateProjectRequest {
        CreateProjectRequest {
            name: "site".to_string(),
            full_name: "acme/site".to_string(),
            script: "./deploy.sh".to_string(),
            script_timeout: Some(300),
            branch: "main".to_string(),
            site: None,
            site_config_path: None,
            site_config: None,
        }
    }

    #[test]
    fn test_create_validation_accepts_complete_request() {
        assert!(validate_create(&create_request()).is_ok());
    }

    #[test]
    fn test_create_validation_rejects_empty_required_fields() {
        for field in ["name", "full_name", "script", "branch"] {
            let mut req = create_request();
            match field {
                "name" => req.name = String::new(),
                "full_name" => req.full_name = "  ".to_string(),
                "script" => req.script = String::new(),
                _ => req.branch = String::new(),
            }
            let err = validate_create(&req).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{} accepted", field);
        }
    }

    #[test]
    fn test_create_validation_rejects_negative_timeout() {
        let mut req = create_request();
        req.script_timeout = Some(-1);
        assert!(validate_create(&req).is_err());

        // 0 means "no timeout" and is valid
        req.script_timeout = Some(0);
        assert!(validate_create(&req).is_ok());
    }

    #[test]
    fn test_update_validation_ignores_absent_fields() {
        let req = UpdateProjectRequest {
            name: None,
            full_name: None,
            script: None,
            script_timeout: None,
            branch: None,
            site: Some("staging".to_string()),
            site_config_path: None,
            site_config: None,
        };
        assert!(validate_update(&req).is_ok());
    }

    #[test]
    fn test_update_validation_rejects_emptied_required_field() {
        let req = UpdateProjectRequest {
            name: None,
            full_name: None,
            script: Some(String::new()),
            script_timeout: None,
            branch: None,
            site: None,
            site_config_path: None,
            site_config: None,
        };
        assert!(validate_update(&req).is_err());
    }
}
