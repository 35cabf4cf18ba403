use crate::config::validation::validate_poll_config;
use crate::config::PollConfig;
use crate::poll::tracker::{LifecycleTracker, Progress};
use crate::task::{TaskClient, TaskState, TaskStatus};
use crate::{ClientError, Result};
use rand::Rng;
use std::time::Duration;

/// Repeatedly reads a task until it settles
///
/// Transient failures (unreachable backend, timeouts, 5xx) use up an attempt
/// and polling continues. Anything else, including a lifecycle regression,
/// stops immediately.
#[derive(Debug, Clone)]
pub struct Poller {
    client: TaskClient,
    config: PollConfig,
}

impl Poller {
    /// Out-of-range schedules are accepted with a warning; the delay never
    /// shrinks below the current interval.
    pub fn new(client: TaskClient, config: PollConfig) -> Self {
        if let Err(e) = validate_poll_config(&config) {
            tracing::warn!(error = %e, "Polling schedule is out of range");
        }
        Self { client, config }
    }

    pub fn client(&self) -> &TaskClient {
        &self.client
    }

    /// Polls until the task is completed or failed
    pub async fn wait_for_terminal(&self, task_id: &str) -> Result<TaskStatus> {
        self.wait_until(task_id, TaskStatus::is_terminal).await
    }

    /// Polls until `done` accepts a snapshot
    ///
    /// A failed task ends the wait even if `done` rejects it, since it will not
    /// change again.
    pub async fn wait_until<P>(&self, task_id: &str, mut done: P) -> Result<TaskStatus>
    where
        P: FnMut(&TaskStatus) -> bool,
    {
        let mut tracker = LifecycleTracker::new();
        let mut delay = self.config.interval();
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            match self.client.get_task(task_id).await {
                Ok(status) => {
                    if let Progress::Advanced { from, to } = tracker.observe(&status)? {
                        tracing::info!(task_id, ?from, %to, message = %status.message, "Task state changed");
                    }
                    if done(&status) || status.status == TaskState::Failed {
                        return Ok(status);
                    }
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_attempts,
                        "Status poll failed, will try again"
                    );
                }
                Err(e) => return Err(e),
            }

            if attempt < max_attempts {
                let wait = if self.config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };
                tracing::debug!(task_id, attempt, delay_ms = wait.as_millis() as u64, "Waiting before next poll");
                tokio::time::sleep(wait).await;
                delay = next_delay(delay, &self.config);
            }
        }

        tracing::error!(task_id, attempts = max_attempts, "Task did not settle");
        Err(ClientError::PollExhausted {
            task_id: task_id.to_string(),
            attempts: max_attempts,
        })
    }
}

/// Grows the delay by the backoff multiplier, capped at the maximum interval
///
/// A multiplier below 1.0 (or NaN) holds the delay steady.
fn next_delay(delay: Duration, config: &PollConfig) -> Duration {
    let multiplier = if config.backoff_multiplier >= 1.0 {
        config.backoff_multiplier
    } else {
        1.0
    };
    Duration::try_from_secs_f64(delay.as_secs_f64() * multiplier)
        .unwrap_or(Duration::MAX)
        .min(config.max_interval())
}

/// Spreads a delay uniformly between 1x and 2x
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + factor))
}
