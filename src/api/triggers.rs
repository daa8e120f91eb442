//! Trigger API handlers: webhook and manual entry points into the pipeline.
//!
//! Authentication and signature verification of webhook deliveries is the
//! fronting collaborator's responsibility; these endpoints consume already
//! trusted payloads.

use actix_web::{HttpResponse, web};

use crate::error::{AppError, AppResult};
use crate::models::{
    GithubPushPayload, ManualTriggerRequest, Trigger, TriggerResponse, TriggerSource,
    TriggerTarget, WebhookTriggerRequest,
};
use crate::services::Ingestor;

/// Github push webhook.
///
/// Resolves the target project by repository full name and pushed branch.
#[utoipa::path(
    post,
    path = "/api/v1/triggers/github",
    tag = "Triggers",
    request_body = GithubPushPayload,
    responses(
        (status = 202, description = "Trigger admitted", body = TriggerResponse),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse),
        (status = 404, description = "No project tracks this repo+branch", body = crate::error::ErrorResponse),
    )
)]
pub async fn github_trigger(
    ingestor: web::Data<Ingestor>,
    body: web::Json<GithubPushPayload>,
) -> AppResult<HttpResponse> {
    let trigger = body.into_inner().into_trigger();
    admit(&ingestor, trigger).await
}

/// Generic webhook trigger.
///
/// Targets a project either by explicit id or by full_name+branch.
#[utoipa::path(
    post,
    path = "/api/v1/triggers/webhook",
    tag = "Triggers",
    request_body = WebhookTriggerRequest,
    responses(
        (status = 202, description = "Trigger admitted", body = TriggerResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown project", body = crate::error::ErrorResponse),
    )
)]
pub async fn webhook_trigger(
    ingestor: web::Data<Ingestor>,
    body: web::Json<WebhookTriggerRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let target = if let Some(id) = req.project_id {
        TriggerTarget::ProjectId(id)
    } else if let Some(full_name) = req.full_name.clone() {
        let branch = req.branch.clone().ok_or_else(|| {
            AppError::Validation("branch is required when targeting by full_name".to_string())
        })?;
        TriggerTarget::Repo { full_name, branch }
    } else {
        return Err(AppError::Validation(
            "either project_id or full_name is required".to_string(),
        ));
    };

    // With an explicit project id the branch field deploys a branch other
    // than the project's configured one
    let branch_override = match target {
        TriggerTarget::ProjectId(_) => req.branch.clone(),
        TriggerTarget::Repo { .. } => None,
    };

    let trigger = Trigger {
        source: TriggerSource::Webhook,
        target,
        commit: req.commit,
        branch_override,
        caption: req.caption,
    };

    admit(&ingestor, trigger).await
}

/// Operator-initiated deploy of a configured project.
#[utoipa::path(
    post,
    path = "/api/v1/triggers/manual",
    tag = "Triggers",
    request_body = ManualTriggerRequest,
    responses(
        (status = 202, description = "Trigger admitted", body = TriggerResponse),
        (status = 404, description = "Unknown project", body = crate::error::ErrorResponse),
    )
)]
pub async fn manual_trigger(
    ingestor: web::Data<Ingestor>,
    body: web::Json<ManualTriggerRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let trigger = Trigger {
        source: TriggerSource::Manual,
        target: TriggerTarget::ProjectId(req.project_id),
        commit: req.commit,
        branch_override: req.branch,
        caption: req.caption,
    };

    admit(&ingestor, trigger).await
}

async fn admit(ingestor: &Ingestor, trigger: Trigger) -> AppResult<HttpResponse> {
    let outcome = ingestor.ingest(trigger).await?;

    let response = TriggerResponse {
        event_id: outcome.event.id,
        project_id: outcome.event.project_id,
        status: outcome.event.status.clone(),
        is_existing: outcome.is_existing,
    };

    Ok(HttpResponse::Accepted().json(response))
}

/// Configure trigger routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/triggers/github").route(web::post().to(github_trigger)))
        .service(web::resource("/triggers/webhook").route(web::post().to(webhook_trigger)))
        .service(web::resource("/triggers/manual").route(web::post().to(manual_trigger)));
}
