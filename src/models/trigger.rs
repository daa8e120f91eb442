//! Trigger DTOs: the external signals that request a deploy.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::event::EventType;

/// Where a trigger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Github,
    Webhook,
    Manual,
}

impl TriggerSource {
    /// Numeric event type recorded for events admitted from this source.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Github => EventType::Github,
            Self::Webhook => EventType::Webhook,
            Self::Manual => EventType::Unknown,
        }
    }
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Github => "github",
            Self::Webhook => "webhook",
            Self::Manual => "manual",
        };
        write!(f, "{}", label)
    }
}

/// How a trigger names its target project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerTarget {
    ProjectId(Uuid),
    Repo { full_name: String, branch: String },
}

/// A normalized trigger, ready for ingestion.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub source: TriggerSource,
    pub target: TriggerTarget,
    pub commit: Option<String>,
    /// Branch recorded on the event when it differs from the resolved
    /// project's configured branch (e.g. a manual deploy of a feature branch).
    pub branch_override: Option<String>,
    pub caption: Option<String>,
}

/// Subset of the Github push webhook payload this service consumes.
///
/// Signature verification happens upstream; by the time the payload reaches
/// the ingestor it is trusted.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GithubPushPayload {
    pub repository: GithubRepository,
    /// Fully-qualified git ref, e.g. "refs/heads/main".
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Head commit SHA after the push.
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub head_commit: Option<GithubCommit>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GithubRepository {
    /// Repository in "owner/repo" format.
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GithubCommit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GithubPushPayload {
    /// Normalize the push payload into a trigger targeting full_name+branch.
    pub fn into_trigger(self) -> Trigger {
        let branch = normalize_git_ref(&self.git_ref).to_string();
        let commit = self
            .after
            .clone()
            .or_else(|| self.head_commit.as_ref().and_then(|c| c.id.clone()));
        let caption = self
            .head_commit
            .and_then(|c| c.message)
            .map(|m| headline(&m));

        Trigger {
            source: TriggerSource::Github,
            target: TriggerTarget::Repo {
                full_name: self.repository.full_name,
                branch,
            },
            commit,
            branch_override: None,
            caption,
        }
    }
}

/// Generic webhook trigger: either an explicit project id, or full_name+branch
/// resolution like the Github path.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookTriggerRequest {
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Operator-initiated deploy of a configured project.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ManualTriggerRequest {
    pub project_id: Uuid,
    #[serde(default)]
    pub commit: Option<String>,
    /// Deploy a branch other than the project's configured one.
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Response after a trigger is admitted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TriggerResponse {
    pub event_id: Uuid,
    pub project_id: Uuid,
    pub status: String,
    /// True when a dedup window matched an existing event instead of
    /// creating a new one.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_existing: bool,
}

/// Strip the "refs/heads/" prefix from a fully-qualified git ref.
/// Tag refs and already-short names are returned unchanged.
pub fn normalize_git_ref(git_ref: &str) -> &str {
    git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref)
}

/// First line of a commit message, for captions.
fn headline(message: &str) -> String {
    message.lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_git_ref() {
        assert_eq!(normalize_git_ref("refs/heads/main"), "main");
        assert_eq!(normalize_git_ref("refs/heads/feature/x"), "feature/x");
        assert_eq!(normalize_git_ref("refs/tags/v1.0"), "refs/tags/v1.0");
        assert_eq!(normalize_git_ref("main"), "main");
    }

    #[test]
    fn test_source_event_type_mapping() {
        assert_eq!(TriggerSource::Github.event_type(), EventType::Github);
        assert_eq!(TriggerSource::Webhook.event_type(), EventType::Webhook);
        assert_eq!(TriggerSource::Manual.event_type(), EventType::Unknown);
    }

    #[test]
    fn test_github_payload_into_trigger() {
        let payload: GithubPushPayload = serde_json::from_value(serde_json::json!({
            "repository": { "full_name": "acme/site" },
            "ref": "refs/heads/main",
            "after": "abc123",
            "head_commit": { "id": "abc123", "message": "fix: landing page\n\ndetails" }
        }))
        .unwrap();

        let trigger = payload.into_trigger();
        assert_eq!(trigger.source, TriggerSource::Github);
        assert_eq!(
            trigger.target,
            TriggerTarget::Repo {
                full_name: "acme/site".to_string(),
                branch: "main".to_string(),
            }
        );
        assert_eq!(trigger.commit.as_deref(), Some("abc123"));
        assert_eq!(trigger.caption.as_deref(), Some("fix: landing page"));
    }

    #[test]
    fn test_github_payload_falls_back_to_head_commit_id() {
        let payload: GithubPushPayload = serde_json::from_value(serde_json::json!({
            "repository": { "full_name": "acme/site" },
            "ref": "refs/heads/main",
            "head_commit": { "id": "def456" }
        }))
        .unwrap();

        assert_eq!(payload.into_trigger().commit.as_deref(), Some("def456"));
    }
}
