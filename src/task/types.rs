//! Wire types for the task API
//!
//! Field names follow the backend's snake_case JSON. Optional request fields are
//! omitted from the body when unset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Input to task creation
///
/// All fields are optional. The backend expects at least one of `category_id`
/// or `keyword`; the client forwards whatever it is given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    /// Session cookie forwarded to the crawl target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,

    /// Authorization header value forwarded to the crawl target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
}

impl TaskRequest {
    pub fn for_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub fn for_category(category_id: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id.into()),
            ..Self::default()
        }
    }

    /// True when neither a category nor a keyword names what to crawl
    pub fn is_untargeted(&self) -> bool {
        self.category_id.is_none() && self.keyword.is_none()
    }
}

/// Lifecycle state of a backend task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    // ===== In-flight States =====
    /// Accepted, crawl not started yet
    Pending,

    /// Crawl in progress
    Running,

    /// Analysis pass running over a completed crawl
    Analyzing,

    // ===== Terminal States =====
    /// Crawl (or analysis) finished; a result is attached
    Completed,

    /// Crawl or analysis failed
    Failed,
}

impl TaskState {
    /// Returns true if the backend will not move this task on its own
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true while the backend is still working on the task
    pub fn is_in_flight(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if a snapshot in this state may carry a crawl result
    ///
    /// The crawl artifact stays attached while an analysis pass runs over it.
    pub fn may_carry_result(&self) -> bool {
        matches!(self, Self::Completed | Self::Analyzing)
    }

    /// Returns true if a task observed in `self` may later be observed in `next`
    ///
    /// Repeating the same state is always allowed. Polls may skip intermediate
    /// states, so `Pending -> Completed` and `Running -> Analyzing` (the crawl
    /// finished and analysis started between two polls) are valid observations.
    pub fn can_advance_to(&self, next: TaskState) -> bool {
        if *self == next {
            return true;
        }
        match self {
            Self::Pending => matches!(
                next,
                Self::Running | Self::Analyzing | Self::Completed | Self::Failed
            ),
            Self::Running => matches!(next, Self::Analyzing | Self::Completed | Self::Failed),
            Self::Completed => matches!(next, Self::Analyzing | Self::Failed),
            Self::Analyzing => matches!(next, Self::Completed | Self::Failed),
            Self::Failed => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to the file a completed crawl produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub file_path: String,
    pub file_name: String,
}

/// Canonical task snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: String,
    pub status: TaskState,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ArtifactRef>,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the crawl artifact when the task completed
    pub fn artifact(&self) -> Option<&ArtifactRef> {
        match self.status {
            TaskState::Completed => self.result.as_ref(),
            _ => None,
        }
    }

    /// Checks that a result is only attached in states that may carry one
    pub fn check_result_invariant(&self) -> crate::Result<()> {
        if self.result.is_some() && !self.status.may_carry_result() {
            return Err(crate::ClientError::UnexpectedResult {
                task_id: self.task_id.clone(),
                state: self.status,
            });
        }
        Ok(())
    }
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub task_id: String,
    pub strategy: String,
}

/// Plain acknowledgement returned by delete and analyze
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub message: String,
}

/// Reply to `POST /analyze`
///
/// Some backends answer with the task's snapshot, others with a bare message.
/// Anything that is not an object (a bare string, or nothing at all) is kept
/// as-is in `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Task(TaskStatus),
    Acknowledged(Confirmation),
    Other(serde_json::Value),
}

impl AnalyzeResponse {
    pub fn message(&self) -> &str {
        match self {
            Self::Task(status) => &status.message,
            Self::Acknowledged(ack) => &ack.message,
            Self::Other(value) => value.as_str().unwrap_or_default(),
        }
    }
}

/// Finalized analysis payload, passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(pub serde_json::Value);

impl AnalysisResult {
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// Which file `GET /download/{task_id}` should return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Raw crawl output
    #[default]
    Raw,
    /// Analysis report
    Analysis,
}

impl ArtifactKind {
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Analysis => "analysis",
        }
    }
}
