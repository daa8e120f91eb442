//! Database queries for deploy events.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::deploy_event::{self as event, ActiveModel, Entity as Event};
use crate::entity::deploy_project::{self as project, Entity as Project};
use crate::error::{AppError, AppResult};
use crate::models::{EventStatus, EventType, QueryEventsParams, UpdateEventRequest};

use super::DbPool;

impl DbPool {
    /// Insert a new pending event for an accepted trigger.
    pub async fn insert_event(
        &self,
        id: Uuid,
        project_id: Uuid,
        event_type: EventType,
        branch: String,
        commit: Option<String>,
        caption: Option<String>,
    ) -> AppResult<event::Model> {
        let model = ActiveModel {
            id: Set(id),
            project_id: Set(project_id),
            event_type: Set(event_type.as_i16()),
            status: Set(EventStatus::Pending.as_str().to_string()),
            status_message: Set(None),
            caption: Set(caption),
            commit: Set(commit),
            branch: Set(branch),
            created_at: Set(Utc::now()),
            started_at: Set(None),
            finished_at: Set(None),
            stdout: Set(String::new()),
            stderr: Set(String::new()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert event: {}", e)))?;

        Ok(result)
    }

    /// Insert an already-terminal error event recording an ingestion failure.
    pub async fn insert_error_event(
        &self,
        project_id: Uuid,
        branch: String,
        message: String,
        caption: Option<String>,
    ) -> AppResult<event::Model> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            project_id: Set(project_id),
            event_type: Set(EventType::Error.as_i16()),
            status: Set(EventStatus::Failed.as_str().to_string()),
            status_message: Set(Some(message)),
            caption: Set(caption),
            commit: Set(None),
            branch: Set(branch),
            created_at: Set(now),
            started_at: Set(None),
            finished_at: Set(Some(now)),
            stdout: Set(String::new()),
            stderr: Set(String::new()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert error event: {}", e)))?;

        Ok(result)
    }

    /// Get an event by ID.
    pub async fn get_event_by_id(&self, id: Uuid) -> AppResult<Option<event::Model>> {
        let result = Event::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get event: {}", e)))?;

        Ok(result)
    }

    /// Get an event with its project joined for display.
    pub async fn get_event_with_project(
        &self,
        id: Uuid,
    ) -> AppResult<Option<(event::Model, Option<project::Model>)>> {
        let result = Event::find_by_id(id)
            .find_also_related(Project)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get event: {}", e)))?;

        Ok(result)
    }

    /// Operator correction of status / status_message.
    pub async fn update_event_fields(
        &self,
        id: Uuid,
        req: &UpdateEventRequest,
    ) -> AppResult<event::Model> {
        let existing = self
            .get_event_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))?;

        let mut active: ActiveModel = existing.into();
        if let Some(ref status) = req.status {
            active.status = Set(status.clone());
        }
        if let Some(ref message) = req.status_message {
            active.status_message = Set(Some(message.clone()));
        }

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update event: {}", e)))?;

        Ok(result)
    }

    /// Transition pending -> running, recording the start time.
    pub async fn mark_event_running(&self, id: Uuid) -> AppResult<event::Model> {
        let existing = self
            .get_event_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))?;

        let mut active: ActiveModel = existing.into();
        active.status = Set(EventStatus::Running.as_str().to_string());
        active.started_at = Set(Some(Utc::now()));

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to mark event running: {}", e)))?;

        Ok(result)
    }

    /// Flush captured output for a running event.
    pub async fn update_event_output(
        &self,
        id: Uuid,
        stdout: String,
        stderr: String,
    ) -> AppResult<()> {
        Event::update_many()
            .col_expr(event::Column::Stdout, Expr::value(stdout))
            .col_expr(event::Column::Stderr, Expr::value(stderr))
            .filter(event::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update event output: {}", e)))?;

        Ok(())
    }

    /// Terminal transition with final output and message.
    pub async fn finish_event(
        &self,
        id: Uuid,
        status: EventStatus,
        status_message: Option<String>,
        stdout: String,
        stderr: String,
    ) -> AppResult<event::Model> {
        let existing = self
            .get_event_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))?;

        let mut active: ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.status_message = Set(status_message);
        active.finished_at = Set(Some(Utc::now()));
        active.stdout = Set(stdout);
        active.stderr = Set(stderr);

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to finish event: {}", e)))?;

        Ok(result)
    }

    /// Terminal transition that leaves captured output untouched
    /// (cancellation before start, startup recovery).
    pub async fn finish_event_without_output(
        &self,
        id: Uuid,
        status: EventStatus,
        status_message: Option<String>,
    ) -> AppResult<event::Model> {
        let existing = self
            .get_event_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))?;

        let mut active: ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.status_message = Set(status_message);
        active.finished_at = Set(Some(Utc::now()));

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to finish event: {}", e)))?;

        Ok(result)
    }

    /// Events currently carrying the given executor status, oldest first.
    /// Used by startup recovery.
    pub async fn list_events_by_status(
        &self,
        status: EventStatus,
    ) -> AppResult<Vec<event::Model>> {
        let result = Event::find()
            .filter(event::Column::Status.eq(status.as_str()))
            .order_by_asc(event::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list events by status: {}", e)))?;

        Ok(result)
    }

    /// Find an event admitted inside the dedup window for the same
    /// project+commit+source. Only consulted when a window is configured.
    pub async fn find_recent_duplicate(
        &self,
        project_id: Uuid,
        commit: &str,
        event_type: EventType,
        since: DateTime<Utc>,
    ) -> AppResult<Option<event::Model>> {
        let result = Event::find()
            .filter(event::Column::ProjectId.eq(project_id))
            .filter(event::Column::Commit.eq(commit))
            .filter(event::Column::EventType.eq(event_type.as_i16()))
            .filter(event::Column::CreatedAt.gte(since))
            .order_by_desc(event::Column::CreatedAt)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check for duplicate: {}", e)))?;

        Ok(result)
    }

    /// Query events with filtering and pagination. Rows carry the joined
    /// project for display; sort is newest-first to match the admin UI.
    pub async fn query_events(
        &self,
        query: &QueryEventsParams,
    ) -> AppResult<(Vec<(event::Model, Option<project::Model>)>, u64)> {
        // The related join doubles as the read-side project lookup for
        // display and as the target of the name/full_name filters.
        let mut select = Event::find().find_also_related(Project);

        if let Some(project_id) = query.project_id {
            select = select.filter(event::Column::ProjectId.eq(project_id));
        }

        if let Some(ref status) = query.status {
            select = select.filter(event::Column::Status.eq(status.as_str()));
        }

        // Substring filters on the joined project, matching the admin UI
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

        if let Some(ref from_date) = query.from_date {
            select = select.filter(event::Column::CreatedAt.gte(*from_date));
        }

        if let Some(ref to_date) = query.to_date {
            select = select.filter(event::Column::CreatedAt.lte(*to_date));
        }

        // Count total before pagination
        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count events: {}", e)))?;

        let limit = query.limit.clamp(1, 100) as u64;
        let offset = query.offset.max(0) as u64;

        let events = select
            .order_by_desc(event::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query events: {}", e)))?;

        Ok((events, total))
    }
}
