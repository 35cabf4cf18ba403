//! Failure classification
//!
//! Every failed call maps to exactly one user-facing message class:
//!
//! | Failure | Class | Text |
//! |---------|-------|------|
//! | No response (connect, DNS, timeout) | NetworkUnreachable | fixed "backend not running" text |
//! | Error status with a non-empty `detail` | BackendRejected | the backend's detail |
//! | Anything else | Generic | fixed fallback text |
//!
//! Classification only produces the message. Propagating the error is the
//! caller's job and always happens.

use crate::ClientError;
use serde_json::Value;
use std::fmt;

/// Shown when the backend cannot be reached
pub const NETWORK_UNREACHABLE_MESSAGE: &str =
    "Cannot connect to the server. Make sure the backend service is running.";

/// Shown when nothing more specific is known
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed, please try again later.";

/// User-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    NetworkUnreachable,
    BackendRejected,
    Generic,
}

/// A classified, human-readable failure message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub class: FailureClass,
    pub text: String,
}

impl UserMessage {
    fn network() -> Self {
        Self {
            class: FailureClass::NetworkUnreachable,
            text: NETWORK_UNREACHABLE_MESSAGE.to_string(),
        }
    }

    fn rejected(detail: &str) -> Self {
        Self {
            class: FailureClass::BackendRejected,
            text: detail.to_string(),
        }
    }

    fn generic() -> Self {
        Self {
            class: FailureClass::Generic,
            text: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Maps a failure to its user-facing message
pub fn classify(error: &ClientError) -> UserMessage {
    match error {
        ClientError::Network { .. } | ClientError::Timeout { .. } => UserMessage::network(),
        ClientError::Rejected {
            detail: Some(detail),
            ..
        } if !detail.trim().is_empty() => UserMessage::rejected(detail),
        ClientError::Rejected { .. }
        | ClientError::Decode { .. }
        | ClientError::UnexpectedPayload { .. }
        | ClientError::ProtocolViolation { .. }
        | ClientError::UnexpectedResult { .. }
        | ClientError::PollExhausted { .. }
        | ClientError::InvalidEndpoint(_)
        | ClientError::Config(_)
        | ClientError::ClientBuild(_)
        | ClientError::Io(_) => UserMessage::generic(),
    }
}

/// Pulls the `detail` string out of an error body
///
/// Returns `None` for empty or non-JSON bodies, and for a `detail` that is not
/// a non-empty string (validation errors carry a list there).
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        _ => None,
    }
}
