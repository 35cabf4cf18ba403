//! Crawl-Tasks: a client for an asynchronous crawl-then-analyze backend
//!
//! This crate submits crawl jobs, reads task snapshots, triggers analysis passes
//! and fetches their results. Backend response drift is absorbed in one place
//! (the status normalizer) and every failed call is classified into a
//! user-facing message before it is handed back to the caller.

pub mod config;
pub mod poll;
pub mod task;
pub mod transport;

use task::TaskState;
use thiserror::Error;

/// Main error type for Crawl-Tasks operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not reach backend at {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Backend rejected {url} with status {status}{}", detail_suffix(.detail))]
    Rejected {
        url: String,
        status: u16,
        detail: Option<String>,
        body: String,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Unrecognized payload from {url}: {payload}")]
    UnexpectedPayload {
        url: String,
        payload: serde_json::Value,
    },

    #[error("Task {task_id} moved backwards: {from} -> {to}")]
    ProtocolViolation {
        task_id: String,
        from: TaskState,
        to: TaskState,
    },

    #[error("Task {task_id} reported {state} with a result attached")]
    UnexpectedResult { task_id: String, state: TaskState },

    #[error("Task {task_id} did not settle after {attempts} polls")]
    PollExhausted { task_id: String, attempts: u32 },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP client error: {0}")]
    ClientBuild(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status of a rejected call, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend answered 404
    ///
    /// Deleting a task twice lands here; callers treat it as "already gone".
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True when no response was obtained at all
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// Returns true if repeating the same call may succeed
    ///
    /// Unreachable backends, timeouts, 5xx and 429 are transient. Everything
    /// else, including protocol violations, is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Rejected { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid header in config: {0}")]
    InvalidHeader(String),
}

/// Result type alias for Crawl-Tasks operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use poll::{LifecycleTracker, Poller};
pub use task::{
    AnalysisResult, AnalyzeResponse, ArtifactKind, ArtifactRef, Confirmation, TaskClient,
    TaskRequest, TaskStatus,
};
pub use transport::{FailureClass, Notifier, Transport, UserMessage};
