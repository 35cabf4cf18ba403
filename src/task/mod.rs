//! Task lifecycle client
//!
//! This module contains everything that talks about tasks:
//! - Wire types for requests, snapshots and analysis payloads
//! - Normalization of the polymorphic status responses
//! - The command set (create, get, list, delete, analyze)
//! - Fetching analysis results and downloading artifacts

mod commands;
mod normalize;
mod results;
mod types;

pub use commands::TaskClient;
pub use normalize::{normalize, NormalizedStatus, StatusPayload};
pub use types::{
    AnalysisRequest, AnalysisResult, AnalyzeResponse, ArtifactKind, ArtifactRef, Confirmation,
    TaskRequest, TaskState, TaskStatus,
};
