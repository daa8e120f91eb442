//! Domain models and DTOs for deployd.

pub mod event;
pub mod project;
pub mod trigger;
pub mod ws_event;

// Re-export commonly used types
pub use event::{
    CancelResponse, EventDetailResponse, EventListResponse, EventStatus, EventSummary, EventType,
    QueryEventsParams, UpdateEventRequest,
};
pub use project::{
    CreateProjectRequest, ProjectListResponse, ProjectResponse, QueryProjectsParams,
    UpdateProjectRequest,
};
pub use trigger::{
    GithubPushPayload, ManualTriggerRequest, Trigger, TriggerResponse, TriggerSource,
    TriggerTarget, WebhookTriggerRequest,
};
pub use ws_event::{WsEvent, WsEventMessage};
