//! Lifecycle tracking across successive snapshots
//!
//! Tasks only move forward. A snapshot that shows an earlier state than one
//! already seen is a protocol violation, not something to retry.

use crate::task::{TaskState, TaskStatus};
use crate::{ClientError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Last state seen for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub state: TaskState,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Outcome of feeding a snapshot to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Same state as the previous snapshot
    Unchanged,

    /// First snapshot, or a forward move
    Advanced {
        from: Option<TaskState>,
        to: TaskState,
    },
}

/// Remembers the last observed state per task id
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    observations: HashMap<String, Observation>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a snapshot
    ///
    /// # Returns
    ///
    /// * `Ok(Progress)` - The snapshot is consistent with earlier ones
    /// * `Err(ClientError::ProtocolViolation)` - The task moved backwards
    /// * `Err(ClientError::UnexpectedResult)` - A result is attached in a state that cannot carry one
    pub fn observe(&mut self, status: &TaskStatus) -> Result<Progress> {
        status.check_result_invariant()?;

        let now = Utc::now();
        let previous = self.observations.get(&status.task_id).map(|o| o.state);

        match previous {
            Some(from) if from == status.status => {
                if let Some(observation) = self.observations.get_mut(&status.task_id) {
                    observation.last_seen = now;
                }
                Ok(Progress::Unchanged)
            }
            Some(from) if !from.can_advance_to(status.status) => {
                Err(ClientError::ProtocolViolation {
                    task_id: status.task_id.clone(),
                    from,
                    to: status.status,
                })
            }
            _ => {
                self.observations.insert(
                    status.task_id.clone(),
                    Observation {
                        state: status.status,
                        first_seen: now,
                        last_seen: now,
                    },
                );
                Ok(Progress::Advanced {
                    from: previous,
                    to: status.status,
                })
            }
        }
    }

    pub fn last_state(&self, task_id: &str) -> Option<TaskState> {
        self.observations.get(task_id).map(|o| o.state)
    }

    pub fn observation(&self, task_id: &str) -> Option<&Observation> {
        self.observations.get(task_id)
    }

    /// Drops what is known about a task, e.g. after deleting it
    pub fn forget(&mut self, task_id: &str) {
        self.observations.remove(task_id);
    }
}
