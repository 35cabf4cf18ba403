//! Status response normalization
//!
//! The status endpoints answer in several shapes:
//!
//! | Shape | Example | Handling |
//! |-------|---------|----------|
//! | List | `[{...}, {...}]` | returned as-is |
//! | Detailed | `{"task_id": .., "result": {"file_path": .., "status": .., ..}}` | re-projected to the four canonical fields |
//! | Canonical | `{"task_id": .., "status": .., "message": ..}` | returned as-is |
//! | Unrecognized | anything else | handed back raw |
//!
//! Single records, canonical or detailed, keep only `task_id`, `status`,
//! `message` and `result`; any other top-level field is dropped.
//!
//! Nothing in here fails. A payload that does not decode comes back as
//! [`NormalizedStatus::Raw`] and the typed accessors decide what to do with it.

use crate::task::types::{ArtifactRef, TaskState, TaskStatus};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Raw status payload, classified by shape
#[derive(Debug, Clone, PartialEq)]
pub enum StatusPayload {
    /// A sequence of task records
    List(Vec<Value>),

    /// A single record carrying a populated `result` object
    Detailed(Map<String, Value>),

    /// A single record without a result
    Canonical(Map<String, Value>),

    /// Neither a list nor a record
    Unrecognized(Value),
}

impl StatusPayload {
    /// Classifies a decoded JSON body
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items),
            Value::Object(map) => match map.get("result") {
                Some(Value::Object(_)) => Self::Detailed(map),
                None | Some(Value::Null) => Self::Canonical(map),
                Some(_) => Self::Unrecognized(Value::Object(map)),
            },
            other => Self::Unrecognized(other),
        }
    }
}

/// Status response after normalization
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedStatus {
    /// List mode
    Many(Vec<TaskStatus>),

    /// Single task in canonical shape
    One(TaskStatus),

    /// Payload that matched no known shape
    Raw(Value),
}

/// Normalizes a status payload into the canonical shape
pub fn normalize(value: Value) -> NormalizedStatus {
    match StatusPayload::classify(value) {
        StatusPayload::List(items) => {
            let decoded: Result<Vec<TaskStatus>, _> =
                items.iter().map(|item| TaskStatus::deserialize(item)).collect();
            match decoded {
                Ok(tasks) => NormalizedStatus::Many(tasks),
                Err(e) => {
                    tracing::debug!(error = %e, "Status list did not decode, returning raw payload");
                    NormalizedStatus::Raw(Value::Array(items))
                }
            }
        }
        StatusPayload::Detailed(map) => match project(&map) {
            Some(status) => NormalizedStatus::One(status),
            None => NormalizedStatus::Raw(Value::Object(map)),
        },
        StatusPayload::Canonical(map) => {
            let value = Value::Object(map);
            match TaskStatus::deserialize(&value) {
                Ok(status) => NormalizedStatus::One(status),
                Err(e) => {
                    tracing::debug!(error = %e, "Status record did not decode, returning raw payload");
                    NormalizedStatus::Raw(value)
                }
            }
        }
        StatusPayload::Unrecognized(value) => NormalizedStatus::Raw(value),
    }
}

/// Rebuilds a detailed record from exactly `task_id`, `status`, `message` and `result`
///
/// The backend's result object also carries its own status and message plus
/// bookkeeping fields; only `file_path` and `file_name` survive. States that
/// may not carry a result (a failed crawl reports its error inside `result`)
/// come out with `result: None`.
fn project(map: &Map<String, Value>) -> Option<TaskStatus> {
    let task_id = map.get("task_id")?.as_str()?.to_string();
    let status = TaskState::deserialize(map.get("status")?).ok()?;
    let message = match map.get("message") {
        None | Some(Value::Null) => String::new(),
        Some(value) => value.as_str()?.to_string(),
    };

    let result = if status.may_carry_result() {
        Some(ArtifactRef::deserialize(map.get("result")?).ok()?)
    } else {
        None
    };

    Some(TaskStatus {
        task_id,
        status,
        message,
        result,
    })
}
