//! Deploy event DTOs and lifecycle enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{deploy_event, deploy_project};

/// Trigger source of a deploy event, stored as its numeric id.
///
/// Ids are part of the wire format consumed by the admin UI:
/// 0=unknown (manual), 1=error bucket, 2=github, 3=webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum EventType {
    Unknown,
    Error,
    Github,
    Webhook,
}

impl EventType {
    pub fn as_i16(&self) -> i16 {
        match self {
            Self::Unknown => 0,
            Self::Error => 1,
            Self::Github => 2,
            Self::Webhook => 3,
        }
    }

    pub fn parse(v: i16) -> Option<Self> {
        match v {
            0 => Some(Self::Unknown),
            1 => Some(Self::Error),
            2 => Some(Self::Github),
            3 => Some(Self::Webhook),
            _ => None,
        }
    }
}

impl From<EventType> for i16 {
    fn from(t: EventType) -> i16 {
        t.as_i16()
    }
}

impl TryFrom<i16> for EventType {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, String> {
        EventType::parse(v).ok_or_else(|| format!("invalid event type: {}", v))
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unknown => "unknown",
            Self::Error => "error",
            Self::Github => "github",
            Self::Webhook => "webhook",
        };
        write!(f, "{}", label)
    }
}

/// Lifecycle labels written by the executor.
///
/// The stored column is free-form to allow operator correction; this enum
/// covers every label the pipeline itself produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Admitted by the ingestor, waiting in its project queue.
    Pending,
    /// Deploy script is executing.
    Running,
    /// Script exited with code 0.
    Success,
    /// Script failed, was cancelled, or could not be spawned.
    Failed,
    /// Script exceeded the project's configured timeout.
    Timedout,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Timedout => "timedout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "timedout" => Some(Self::Timedout),
            _ => None,
        }
    }

    /// Terminal states admit no further automatic transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Timedout)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event row for list responses. Carries the joined project name for display;
/// omits the captured logs.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Joined project short name; None when the reference dangles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[schema(value_type = i16)]
    pub event_type: EventType,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    pub branch: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl EventSummary {
    pub fn from_models(
        event: deploy_event::Model,
        project: Option<deploy_project::Model>,
    ) -> Self {
        EventSummary {
            id: event.id,
            project_id: event.project_id,
            project_name: project.map(|p| p.name),
            event_type: EventType::parse(event.event_type).unwrap_or(EventType::Unknown),
            status: event.status,
            status_message: event.status_message,
            caption: event.caption,
            commit: event.commit,
            branch: event.branch,
            created_at: event.created_at,
            started_at: event.started_at,
            finished_at: event.finished_at,
        }
    }
}

/// Full event record including captured logs.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub summary: EventSummary,
    /// Captured console log.
    pub stdout: String,
    /// Captured error log.
    pub stderr: String,
}

impl EventDetailResponse {
    pub fn from_models(
        event: deploy_event::Model,
        project: Option<deploy_project::Model>,
    ) -> Self {
        let stdout = event.stdout.clone();
        let stderr = event.stderr.clone();
        EventDetailResponse {
            summary: EventSummary::from_models(event, project),
            stdout,
            stderr,
        }
    }
}

/// Event list response with pagination.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventListResponse {
    pub events: Vec<EventSummary>,
    pub total: i64,
    pub limit: i32,
    pub offset: i32,
}

/// Operator correction of an event record.
///
/// Only the lifecycle label and its message are editable; captured output and
/// the commit ref are not.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// Query parameters for listing events.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QueryEventsParams {
    /// Filter by owning project id.
    #[serde(default)]
    pub project_id: Option<Uuid>,
    /// Substring filter on the joined project short name (case-insensitive).
    #[serde(default)]
    pub name: Option<String>,
    /// Substring filter on the joined project "owner/repo" (case-insensitive).
    #[serde(default)]
    pub full_name: Option<String>,
    /// Filter by exact status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Filter from date.
    #[serde(default)]
    pub from_date: Option<DateTime<Utc>>,
    /// Filter to date.
    #[serde(default)]
    pub to_date: Option<DateTime<Utc>>,
    /// Maximum results to return.
    #[serde(default = "default_limit")]
    pub limit: i32,
    /// Offset for pagination.
    #[serde(default)]
    pub offset: i32,
}

fn default_limit() -> i32 {
    20
}

/// Response to a cancel request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CancelResponse {
    pub event_id: Uuid,
    /// "dequeued" when cancelled before start, "signalled" when the running
    /// subprocess was told to stop.
    pub outcome: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_roundtrip() {
        for (id, ty) in [
            (0, EventType::Unknown),
            (1, EventType::Error),
            (2, EventType::Github),
            (3, EventType::Webhook),
        ] {
            assert_eq!(ty.as_i16(), id);
            assert_eq!(EventType::parse(id), Some(ty));
        }
        assert_eq!(EventType::parse(4), None);
        assert_eq!(EventType::parse(-1), None);
    }

    #[test]
    fn test_event_type_serializes_as_number() {
        let json = serde_json::to_string(&EventType::Github).unwrap();
        assert_eq!(json, "2");

        let parsed: EventType = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, EventType::Webhook);

        assert!(serde_json::from_str::<EventType>("7").is_err());
    }

    #[test]
    fn test_status_parse_and_terminal() {
        assert_eq!(EventStatus::parse("pending"), Some(EventStatus::Pending));
        assert_eq!(EventStatus::parse("timedout"), Some(EventStatus::Timedout));
        assert_eq!(EventStatus::parse("nonsense"), None);

        assert!(!EventStatus::Pending.is_terminal());
        assert!(!EventStatus::Running.is_terminal());
        assert!(EventStatus::Success.is_terminal());
        assert!(EventStatus::Failed.is_terminal());
        assert!(EventStatus::Timedout.is_terminal());
    }
}
