//! Task commands
//!
//! Each operation is a single request through the shared [`Transport`]. The
//! client keeps no state between calls beyond its configuration.

use crate::config::{Config, DEFAULT_STRATEGY};
use crate::task::normalize::{normalize, NormalizedStatus};
use crate::task::types::{AnalysisRequest, AnalyzeResponse, Confirmation, TaskRequest, TaskStatus};
use crate::transport::{Notifier, Transport};
use crate::{ClientError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Client for the crawl task API
#[derive(Debug, Clone)]
pub struct TaskClient {
    transport: Transport,
    default_strategy: String,
}

impl TaskClient {
    /// Wraps an existing transport; analysis defaults to `"top50"`
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            default_strategy: DEFAULT_STRATEGY.to_string(),
        }
    }

    /// Builds the transport and client from configuration
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let transport = Transport::new(&config.backend, notifier)?;
        Ok(Self::new(transport).with_default_strategy(config.analysis.default_strategy.clone()))
    }

    /// Sets the strategy used when `start_analyze` is called without one
    pub fn with_default_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.default_strategy = strategy.into();
        self
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn default_strategy(&self) -> &str {
        &self.default_strategy
    }

    /// Submits a crawl job
    ///
    /// Every call creates a new backend task, identical requests included.
    pub async fn create_task(&self, request: &TaskRequest) -> Result<TaskStatus> {
        if request.is_untargeted() {
            tracing::warn!("Submitting crawl without category or keyword; backend will likely reject it");
        }
        let status: TaskStatus = self.transport.post(&["crawl"], request).await?;
        tracing::info!(task_id = %status.task_id, status = %status.status, "Task created");
        Ok(status)
    }

    /// Fetches one task's current snapshot, normalized to the canonical shape
    pub async fn get_task(&self, task_id: &str) -> Result<TaskStatus> {
        match self.fetch_status(task_id).await? {
            NormalizedStatus::One(status) => Ok(status),
            NormalizedStatus::Many(tasks) => {
                let payload = serde_json::to_value(&tasks).unwrap_or(Value::Null);
                Err(self.unexpected_at(&["status", task_id], payload))
            }
            NormalizedStatus::Raw(payload) => Err(self.unexpected_at(&["status", task_id], payload)),
        }
    }

    /// Fetches the status payload for one task without forcing a shape
    ///
    /// Payloads that match no known shape come back as [`NormalizedStatus::Raw`].
    pub async fn fetch_status(&self, task_id: &str) -> Result<NormalizedStatus> {
        let payload: Value = self.transport.get(&["status", task_id]).await?;
        Ok(normalize(payload))
    }

    /// Fetches every task the backend knows about
    pub async fn list_tasks(&self) -> Result<Vec<TaskStatus>> {
        let payload: Value = self.transport.get(&["tasks"]).await?;
        match normalize(payload) {
            NormalizedStatus::Many(tasks) => Ok(tasks),
            NormalizedStatus::One(status) => {
                let payload = serde_json::to_value(&status).unwrap_or(Value::Null);
                Err(self.unexpected_at(&["tasks"], payload))
            }
            NormalizedStatus::Raw(payload) => Err(self.unexpected_at(&["tasks"], payload)),
        }
    }

    /// Removes a task record
    ///
    /// Deleting an unknown id fails with a backend 404; see
    /// [`ClientError::is_not_found`].
    pub async fn delete_task(&self, task_id: &str) -> Result<Confirmation> {
        // 204 No Content arrives as an empty body
        let confirmation: Option<Confirmation> = self.transport.delete(&["tasks", task_id]).await?;
        tracing::info!(task_id, "Task deleted");
        Ok(confirmation.unwrap_or_default())
    }

    /// Starts an analysis pass over a task's crawl output
    ///
    /// The backend only accepts this once the task is `completed` and rejects it
    /// otherwise; no local check is made. `strategy` falls back to the client's
    /// default strategy.
    pub async fn start_analyze(&self, task_id: &str, strategy: Option<&str>) -> Result<AnalyzeResponse> {
        let request = AnalysisRequest {
            task_id: task_id.to_string(),
            strategy: strategy.unwrap_or(&self.default_strategy).to_string(),
        };
        let response: AnalyzeResponse = self.transport.post(&["analyze"], &request).await?;
        tracing::info!(task_id, strategy = %request.strategy, "Analysis started");
        Ok(response)
    }

    fn unexpected_at(&self, segments: &[&str], payload: Value) -> ClientError {
        let url = self
            .transport
            .endpoint(segments)
            .map(|u| u.to_string())
            .unwrap_or_default();
        self.unexpected(&url, payload)
    }

    /// Builds and surfaces the error for a payload a typed call cannot use
    fn unexpected(&self, url: &str, payload: Value) -> ClientError {
        let error = ClientError::UnexpectedPayload {
            url: url.to_string(),
            payload,
        };
        self.transport.surface(&error);
        error
    }
}
