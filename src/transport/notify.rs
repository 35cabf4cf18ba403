//! Where classified failure messages go

use crate::transport::classify::{FailureClass, UserMessage};

/// Capability to show a failure message to whoever is driving the client
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &UserMessage);
}

/// Sends messages to the tracing subscriber at error level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &UserMessage) {
        tracing::error!(class = ?message.class, "{}", message.text);
    }
}

/// Prints messages to stderr, for interactive use
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &UserMessage) {
        let prefix = match message.class {
            FailureClass::NetworkUnreachable => "✗ network",
            FailureClass::BackendRejected => "✗ backend",
            FailureClass::Generic => "✗ error",
        };
        eprintln!("{}: {}", prefix, message.text);
    }
}
