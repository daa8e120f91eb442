//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Deployd",
        version = "0.3.0",
        description = "Deploy event ingestion and execution tracker: CRUD over deploy projects and events, webhook/manual triggers, script execution with captured logs"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Project endpoints
        api::projects::create_project,
        api::projects::list_projects,
        api::projects::get_project,
        api::projects::update_project,
        // Event endpoints
        api::events::query_events,
        api::events::get_event,
        api::events::update_event,
        api::events::cancel_event,
        // Trigger endpoints
        api::triggers::github_trigger,
        api::triggers::webhook_trigger,
        api::triggers::manual_trigger,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Projects
            models::CreateProjectRequest,
            models::UpdateProjectRequest,
            models::ProjectResponse,
            models::ProjectListResponse,
            // Events
            models::EventStatus,
            models::EventSummary,
            models::EventDetailResponse,
            models::EventListResponse,
            models::UpdateEventRequest,
            models::CancelResponse,
            // Triggers
            models::GithubPushPayload,
            models::trigger::GithubRepository,
            models::trigger::GithubCommit,
            models::WebhookTriggerRequest,
            models::ManualTriggerRequest,
            models::TriggerResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Projects", description = "Deploy project configuration"),
        (name = "Events", description = "Deploy event records and logs"),
        (name = "Triggers", description = "Webhook and manual deploy triggers"),
    )
)]
pub struct ApiDoc;
