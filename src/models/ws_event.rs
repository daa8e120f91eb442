//! WebSocket event types for real-time updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// WebSocket event sent to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
#[serde(rename_all = "snake_case")]
pub enum WsEvent {
    /// A new deploy event was admitted.
    EventCreated(EventCreatedPayload),
    /// A deploy event changed status.
    EventUpdated(EventUpdatedPayload),
}

/// Payload for event_created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCreatedPayload {
    pub event_id: Uuid,
    pub project_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for event_updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventUpdatedPayload {
    pub event_id: Uuid,
    pub project_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Wrapper that includes timestamp with every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEventMessage {
    #[serde(flatten)]
    pub event: WsEvent,
    pub timestamp: DateTime<Utc>,
}

impl WsEventMessage {
    /// Create a new event message with the current timestamp.
    pub fn new(event: WsEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}

impl WsEvent {
    /// Create an event_created message.
    pub fn event_created(event_id: Uuid, project_id: Uuid, status: String) -> Self {
        WsEvent::EventCreated(EventCreatedPayload {
            event_id,
            project_id,
            status,
            created_at: Utc::now(),
        })
    }

    /// Create an event_updated message.
    pub fn event_updated(
        event_id: Uuid,
        project_id: Uuid,
        status: String,
        status_message: Option<String>,
    ) -> Self {
        WsEvent::EventUpdated(EventUpdatedPayload {
            event_id,
            project_id,
            status,
            status_message,
            updated_at: Utc::now(),
        })
    }
}
