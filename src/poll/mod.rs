//! Polling helpers
//!
//! The task client only offers single-shot reads. This module layers a
//! polling schedule on top of it:
//!
//! - `LifecycleTracker`: rejects snapshots that move a task backwards
//! - `Poller`: waits for a task to settle with exponential backoff

mod tracker;
mod waiter;

pub use tracker::{LifecycleTracker, Observation, Progress};
pub use waiter::Poller;
