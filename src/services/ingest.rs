//! Event ingestor: validates triggers and admits them into the pipeline.
//!
//! Exactly one pending DeployEvent is persisted per accepted trigger; the
//! ingest path returns as soon as the event is durably queued and never waits
//! on execution.

use chrono::{Duration as ChronoDuration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::db::DbPool;
use crate::entity::{deploy_event, deploy_project};
use crate::error::{AppError, AppResult};
use crate::models::{Trigger, TriggerTarget, WsEvent, WsEventMessage};
use crate::services::{EventBroadcaster, Executor};

/// Result of admitting a trigger.
pub struct IngestOutcome {
    pub event: deploy_event::Model,
    /// True when a configured dedup window matched an existing event.
    pub is_existing: bool,
}

/// Admits external triggers into the deploy pipeline.
#[derive(Clone)]
pub struct Ingestor {
    db: DbPool,
    executor: Executor,
    broadcaster: EventBroadcaster,
    /// Duplicate-trigger window in seconds; 0 admits every trigger.
    dedup_window_secs: u64,
    /// Record unresolvable triggers as error events against the sentinel project.
    record_unresolved: bool,
}

impl Ingestor {
    pub fn new(
        db: DbPool,
        executor: Executor,
        broadcaster: EventBroadcaster,
        config: &Config,
    ) -> Self {
        Ingestor {
            db,
            executor,
            broadcaster,
            dedup_window_secs: config.dedup_window_secs,
            record_unresolved: config.record_unresolved,
        }
    }

    /// Validate and admit a trigger.
    ///
    /// On success exactly one pending event exists and its id has been handed
    /// to the executor's per-project queue.
    pub async fn ingest(&self, trigger: Trigger) -> AppResult<IngestOutcome> {
        let project = self.resolve_project(&trigger).await?;

        // The event records the branch at trigger time, which may differ from
        // the project's configured branch on manual deploys
        let branch = trigger
            .branch_override
            .clone()
            .unwrap_or_else(|| project.branch.clone());

        // Dedup is explicit opt-in configuration; the default admits all
        if self.dedup_window_secs > 0
            && let Some(ref commit) = trigger.commit
        {
            let since = Utc::now() - ChronoDuration::seconds(self.dedup_window_secs as i64);
            if let Some(existing) = self
                .db
                .find_recent_duplicate(project.id, commit, trigger.source.event_type(), since)
                .await?
            {
                info!(
                    event_id = %existing.id,
                    project = %project.name,
                    commit = %commit,
                    "duplicate trigger inside dedup window, returning existing event"
                );
                return Ok(IngestOutcome {
                    event: existing,
                    is_existing: true,
                });
            }
        }

        let event = self
            .db
            .insert_event(
                Uuid::now_v7(),
                project.id,
                trigger.source.event_type(),
                branch,
                trigger.commit.clone(),
                trigger.caption.clone(),
            )
            .await?;

        self.broadcaster.send(WsEventMessage::new(WsEvent::event_created(
            event.id,
            project.id,
            event.status.clone(),
        )));
        info!(
            event_id = %event.id,
            project = %project.name,
            source = %trigger.source,
            "trigger admitted"
        );

        // Durably recorded; execution happens on the project's queue
        self.executor.submit(project.id, event.id);

        Ok(IngestOutcome {
            event,
            is_existing: false,
        })
    }

    /// Resolve the trigger's target to a configured project.
    async fn resolve_project(&self, trigger: &Trigger) -> AppResult<deploy_project::Model> {
        let (found, target) = match &trigger.target {
            TriggerTarget::ProjectId(id) => (
                self.db.get_project_by_id(*id).await?,
                format!("project {}", id),
            ),
            TriggerTarget::Repo { full_name, branch } => (
                self.db.find_project_by_repo(full_name, branch).await?,
                format!("{}@{}", full_name, branch),
            ),
        };

        match found {
            Some(project) => Ok(project),
            None => {
                warn!(
                    target = %target,
                    source = %trigger.source,
                    "trigger does not resolve to a configured project"
                );
                if self.record_unresolved {
                    self.record_unresolved_trigger(trigger, &target).await;
                }
                Err(AppError::UnknownProject(target))
            }
        }
    }

    /// Record an unresolvable trigger in the operator-visible error bucket.
    /// These events are created terminal and never executed.
    async fn record_unresolved_trigger(&self, trigger: &Trigger, target: &str) {
        let branch = match &trigger.target {
            TriggerTarget::Repo { branch, .. } => branch.clone(),
            TriggerTarget::ProjectId(_) => trigger.branch_override.clone().unwrap_or_default(),
        };

        let result = async {
            let sentinel = self.db.ensure_error_project().await?;
            self.db
                .insert_error_event(
                    sentinel.id,
                    branch,
                    format!(
                        "{} trigger could not be resolved: {}",
                        trigger.source, target
                    ),
                    trigger.caption.clone(),
                )
                .await
        }
        .await;

        if let Err(e) = result {
            warn!("failed to record unresolved trigger: {}", e);
        }
    }
}
