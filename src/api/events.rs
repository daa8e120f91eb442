//! Deploy event API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CancelResponse, EventDetailResponse, EventListResponse, EventStatus, EventSummary,
    QueryEventsParams, UpdateEventRequest, WsEvent, WsEventMessage,
};
use crate::services::{CancelOutcome, EventBroadcaster, Executor};

/// Query events with filtering and pagination.
///
/// Rows carry the joined project name for display and omit the captured logs;
/// fetch a single event for the full record.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    params(
        ("project_id" = Option<Uuid>, Query, description = "Filter by owning project"),
        ("name" = Option<String>, Query, description = "Filter by project short name (substring, case-insensitive)"),
        ("full_name" = Option<String>, Query, description = "Filter by project owner/repo (substring, case-insensitive)"),
        ("status" = Option<String>, Query, description = "Filter by exact status label"),
        ("from_date" = Option<String>, Query, description = "Filter from date (ISO 8601)"),
        ("to_date" = Option<String>, Query, description = "Filter to date (ISO 8601)"),
        ("limit" = Option<i32>, Query, description = "Results per page (default 20, max 100)"),
        ("offset" = Option<i32>, Query, description = "Pagination offset")
    ),
    responses(
        (status = 200, description = "List of events, newest first", body = EventListResponse),
    )
)]
pub async fn query_events(
    pool: web::Data<DbPool>,
    query: web::Query<QueryEventsParams>,
) -> AppResult<HttpResponse> {
    let params = query.into_inner();
    let (events, total) = pool.query_events(&params).await?;

    let response = EventListResponse {
        events: events
            .into_iter()
            .map(|(event, project)| EventSummary::from_models(event, project))
            .collect(),
        total: total as i64,
        limit: params.limit,
        offset: params.offset,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Get a single event by ID, including captured logs.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event UUID")
    ),
    responses(
        (status = 200, description = "Event details", body = EventDetailResponse),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_event(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let (event, project) = pool
        .get_event_with_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))?;

    Ok(HttpResponse::Ok().json(EventDetailResponse::from_models(event, project)))
}

/// Operator correction of an event record.
///
/// Only `status` and `status_message` are editable; the captured logs and the
/// commit ref never are.
#[utoipa::path(
    put,
    path = "/api/v1/events/{id}",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event UUID")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventDetailResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_event(
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateEventRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();

    if req.status.is_none() && req.status_message.is_none() {
        return Err(AppError::Validation(
            "at least one of status, status_message is required".to_string(),
        ));
    }

    let event = pool.update_event_fields(id, &req).await?;

    info!(event_id = %event.id, status = %event.status, "event corrected by operator");

    broadcaster.send(WsEventMessage::new(WsEvent::event_updated(
        event.id,
        event.project_id,
        event.status.clone(),
        event.status_message.clone(),
    )));

    let project = pool.get_project_by_id(event.project_id).await?;
    Ok(HttpResponse::Ok().json(EventDetailResponse::from_models(event, project)))
}

/// Cancel a queued or running event.
///
/// A queued event transitions pending -> failed ("cancelled") without ever
/// running; a running event has its deploy script killed.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/cancel",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event UUID")
    ),
    responses(
        (status = 200, description = "Cancellation initiated", body = CancelResponse),
        (status = 400, description = "Event is already terminal", body = crate::error::ErrorResponse),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn cancel_event(
    pool: web::Data<DbPool>,
    executor: web::Data<Executor>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let event = pool
        .get_event_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))?;

    if let Some(status) = EventStatus::parse(&event.status)
        && status.is_terminal()
    {
        return Err(AppError::Validation(format!(
            "event {} already finished with status {}",
            id, status
        )));
    }

    let outcome = executor.cancel(id).await?;

    let response = CancelResponse {
        event_id: id,
        outcome: match outcome {
            CancelOutcome::Dequeued => "dequeued".to_string(),
            CancelOutcome::Signalled => "signalled".to_string(),
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Configure event routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/events").route(web::get().to(query_events)))
        .service(
            web::resource("/events/{id}")
                .route(web::get().to(get_event))
                .route(web::put().to(update_event)),
        )
        .service(web::resource("/events/{id}/cancel").route(web::post().to(cancel_event)));
}
