use crate::common::{client_for, fast_poll};
use crawl_tasks::poll::Poller;
use crawl_tasks::task::TaskState;
use crawl_tasks::ClientError;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_status_once(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/status/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

fn status(state: &str) -> serde_json::Value {
    json!({"task_id": "t1", "status": state, "message": ""})
}

fn completed() -> serde_json::Value {
    json!({
        "task_id": "t1",
        "status": "completed",
        "message": "done",
        "result": {"file_path": "/data/t1.csv", "file_name": "t1.csv"}
    })
}

#[tokio::test]
async fn test_wait_for_terminal_follows_lifecycle() {
    let mock_server = MockServer::start().await;
    mount_status_once(&mock_server, status("pending")).await;
    mount_status_once(&mock_server, status("running")).await;
    mount_status_once(&mock_server, completed()).await;

    let (client, notifier) = client_for(&mock_server);
    let poller = Poller::new(client, fast_poll(10));

    let finished = poller.wait_for_terminal("t1").await.unwrap();
    assert_eq!(finished.status, TaskState::Completed);
    assert!(finished.result.is_some());
    assert!(notifier.messages().is_empty());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_failed_task_ends_wait() {
    let mock_server = MockServer::start().await;
    mount_status_once(&mock_server, status("running")).await;
    mount_status_once(
        &mock_server,
        json!({"task_id": "t1", "status": "failed", "message": "crawl failed: blocked"}),
    )
    .await;

    let (client, _) = client_for(&mock_server);
    let poller = Poller::new(client, fast_poll(10));

    let finished = poller
        .wait_until("t1", |s| s.status == TaskState::Completed)
        .await
        .unwrap();
    assert_eq!(finished.status, TaskState::Failed);
    assert_eq!(finished.message, "crawl failed: blocked");
}

#[tokio::test]
async fn test_analysis_started_between_polls() {
    let mock_server = MockServer::start().await;
    mount_status_once(&mock_server, status("running")).await;
    mount_status_once(
        &mock_server,
        json!({
            "task_id": "t1",
            "status": "analyzing",
            "message": "analysis running",
            "result": {"file_path": "/data/t1.csv", "file_name": "t1.csv"}
        }),
    )
    .await;
    mount_status_once(&mock_server, completed()).await;

    let (client, notifier) = client_for(&mock_server);
    let poller = Poller::new(client, fast_poll(10));

    let finished = poller.wait_for_terminal("t1").await.unwrap();
    assert_eq!(finished.status, TaskState::Completed);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_regression_is_protocol_violation() {
    let mock_server = MockServer::start().await;
    mount_status_once(&mock_server, status("running")).await;
    mount_status_once(&mock_server, status("pending")).await;

    let (client, _) = client_for(&mock_server);
    let poller = Poller::new(client, fast_poll(10));

    let err = poller.wait_for_terminal("t1").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::ProtocolViolation {
            from: TaskState::Running,
            to: TaskState::Pending,
            ..
        }
    ));
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/status/t1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_status_once(&mock_server, completed()).await;

    let (client, notifier) = client_for(&mock_server);
    let poller = Poller::new(client, fast_poll(5));

    let finished = poller.wait_for_terminal("t1").await.unwrap();
    assert_eq!(finished.status, TaskState::Completed);

    // Each failed poll is still surfaced
    assert_eq!(notifier.messages().len(), 2);
}

#[tokio::test]
async fn test_permanent_failure_stops_polling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/status/t1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "task not found"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server);
    let poller = Poller::new(client, fast_poll(5));

    let err = poller.wait_for_terminal("t1").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_poll_exhaustion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/status/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status("running")))
        .expect(3)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server);
    let poller = Poller::new(client, fast_poll(3));

    let err = poller.wait_for_terminal("t1").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::PollExhausted { attempts: 3, .. }
    ));
}
