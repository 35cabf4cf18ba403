//! Result fetching for finished tasks

use crate::task::commands::TaskClient;
use crate::task::types::{AnalysisResult, ArtifactKind};
use crate::{ClientError, Result};
use std::path::Path;

impl TaskClient {
    /// Fetches the finalized analysis payload for a task
    ///
    /// Only meaningful after an analysis started by
    /// [`start_analyze`](TaskClient::start_analyze) has finished.
    pub async fn get_analysis_results(&self, task_id: &str) -> Result<AnalysisResult> {
        let result: AnalysisResult = self.transport().get(&["analysis", task_id]).await?;
        tracing::debug!(task_id, "Fetched analysis result");
        Ok(result)
    }

    /// Downloads the raw crawl file or the analysis report for a task
    pub async fn download_artifact(&self, task_id: &str, kind: ArtifactKind) -> Result<Vec<u8>> {
        let bytes = self
            .transport()
            .get_bytes(&["download", task_id], &[("type", kind.as_query())])
            .await?;
        tracing::debug!(task_id, kind = kind.as_query(), size = bytes.len(), "Downloaded artifact");
        Ok(bytes)
    }

    /// Downloads an artifact and writes it to `output`, returning the byte count
    ///
    /// A failed write is reported through the notifier like any failed request.
    pub async fn save_artifact(&self, task_id: &str, kind: ArtifactKind, output: &Path) -> Result<usize> {
        let bytes = self.download_artifact(task_id, kind).await?;
        if let Err(e) = tokio::fs::write(output, &bytes).await {
            let err = ClientError::Io(e);
            self.transport().surface(&err);
            return Err(err);
        }
        tracing::info!(task_id, path = %output.display(), "Saved artifact");
        Ok(bytes.len())
    }
}
