//! Transport layer
//!
//! The configured HTTP entry point, the failure classifier and the capability
//! used to show classified failures to a user.

mod adapter;
mod classify;
mod notify;

pub use adapter::Transport;
pub use classify::{
    classify, extract_detail, FailureClass, UserMessage, GENERIC_FAILURE_MESSAGE,
    NETWORK_UNREACHABLE_MESSAGE,
};
pub use notify::{ConsoleNotifier, Notifier, TracingNotifier};
