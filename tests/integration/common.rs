use crawl_tasks::config::{BackendConfig, PollConfig};
use crawl_tasks::task::TaskClient;
use crawl_tasks::transport::{FailureClass, Notifier, Transport, UserMessage};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// Notifier that keeps every message it is given
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<UserMessage>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<UserMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn classes(&self) -> Vec<FailureClass> {
        self.messages().into_iter().map(|m| m.class).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &UserMessage) {
        self.messages.lock().unwrap().push(message.clone());
    }
}

pub fn backend_config(base_url: String) -> BackendConfig {
    BackendConfig {
        base_url,
        timeout_ms: 2_000,
        ..BackendConfig::default()
    }
}

/// Builds a client for `base_url` that records surfaced failures
pub fn client_at(config: &BackendConfig) -> (TaskClient, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let transport = Transport::new(config, notifier.clone()).expect("Failed to build transport");
    (TaskClient::new(transport), notifier)
}

/// Builds a client pointed at the mock server's `/api` root
pub fn client_for(server: &MockServer) -> (TaskClient, Arc<RecordingNotifier>) {
    client_at(&backend_config(format!("{}/api", server.uri())))
}

/// Address nothing is listening on
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind a local port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

/// Fast schedule so tests do not sleep
pub fn fast_poll(max_attempts: u32) -> PollConfig {
    PollConfig {
        interval_ms: 1,
        max_interval_ms: 5,
        backoff_multiplier: 1.0,
        max_attempts,
        jitter: false,
    }
}
