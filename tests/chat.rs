use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use openai_assistant::{
    assistants::runs::Status,
    remember::{BATCH_SCRIPT, SHELL_SCRIPT},
    AssistantError, AssistantSession, Credentials, FunctionMap, OpenAiClient, PollConfig,
    SessionConfig,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

const THREAD: &str = "thread_1";
const RUN: &str = "run_1";

fn run_json(status: &str, tool_calls: &Value) -> Value {
    let mut run = json!({
        "id": RUN,
        "object": "thread.run",
        "created_at": 1_700_000_000,
        "assistant_id": "asst_1",
        "thread_id": THREAD,
        "status": status,
        "model": "gpt-4o",
        "tools": []
    });
    if status == "requires_action" {
        run["required_action"] = json!({
            "type": "submit_tool_outputs",
            "submit_tool_outputs": { "tool_calls": tool_calls }
        });
    }
    if status == "failed" {
        run["last_error"] = json!({ "code": "rate_limit_exceeded", "message": "Slow down" });
    }
    run
}

fn message_json(id: &str, role: &str, text: &str) -> Value {
    json!({
        "id": id,
        "object": "thread.message",
        "created_at": 1_700_000_000,
        "thread_id": THREAD,
        "role": role,
        "content": [{ "type": "text", "text": { "value": text, "annotations": [] } }]
    })
}

/// Answers run status checks with the given statuses in order, repeating the
/// last one once they run out.
struct StatusSequence {
    statuses: Vec<&'static str>,
    tool_calls: Value,
    calls: AtomicUsize,
}

impl StatusSequence {
    fn new(statuses: &[&'static str], tool_calls: Value) -> Self {
        Self {
            statuses: statuses.to_vec(),
            tool_calls,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for StatusSequence {
    fn respond(&self, _: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let status = self.statuses[call.min(self.statuses.len() - 1)];
        ResponseTemplate::new(200).set_body_json(run_json(status, &self.tool_calls))
    }
}

fn read_readme_call() -> Value {
    json!([{
        "id": "call_1",
        "type": "function",
        "function": { "name": "read_readme", "arguments": "" }
    }])
}

async fn mount_conversation(server: &MockServer, create_thread: u64) {
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": THREAD,
            "object": "thread",
            "created_at": 1_700_000_000
        })))
        .expect(create_thread)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/threads/{THREAD}/messages")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(message_json("msg_user", "user", "hi")),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/threads/{THREAD}/runs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_json("queued", &json!([]))))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/threads/{THREAD}/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                message_json("msg_reply", "assistant", "The project is a demo."),
                message_json("msg_user", "user", "hi")
            ],
            "first_id": "msg_reply",
            "last_id": "msg_user",
            "has_more": false
        })))
        .mount(server)
        .await;
}

async fn mount_submit(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/threads/{THREAD}/runs/{RUN}/submit_tool_outputs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_json("queued", &json!([]))))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_statuses(server: &MockServer, sequence: StatusSequence, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/threads/{THREAD}/runs/{RUN}")))
        .respond_with(sequence)
        .expect(expected)
        .mount(server)
        .await;
}

fn session(server: &MockServer, work_dir: &Path, max_attempts: u32) -> AssistantSession {
    let client = OpenAiClient::new(Credentials::new("sk-test", server.uri())).unwrap();
    let config = SessionConfig::new("asst_1")
        .poll(PollConfig {
            interval: Duration::from_millis(1),
            max_attempts,
        })
        .work_dir(work_dir)
        .script_dir(work_dir);
    AssistantSession::new(client, FunctionMap::with_defaults(), config)
}

#[tokio::test]
async fn tool_round_then_completion() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();
    fs::write(work.path().join("README.md"), "# Demo\n").unwrap();

    mount_conversation(&server, 1).await;
    mount_submit(&server, 1).await;
    mount_statuses(
        &server,
        StatusSequence::new(
            &["queued", "in_progress", "requires_action", "completed"],
            read_readme_call(),
        ),
        4,
    )
    .await;

    let response = session(&server, work.path(), 10)
        .chat("What is this project?", None)
        .await
        .unwrap();

    assert_eq!(response.thread_id, THREAD);
    assert_eq!(response.messages.len(), 2);
    assert_eq!(response.reply().as_deref(), Some("The project is a demo."));

    let requests = server.received_requests().await.unwrap();
    let submit = requests
        .iter()
        .find(|request| request.url.path().ends_with("/submit_tool_outputs"))
        .unwrap();
    let body: Value = serde_json::from_slice(&submit.body).unwrap();
    assert_eq!(
        body,
        json!({ "tool_outputs": [{ "tool_call_id": "call_1", "output": "# Demo\n" }] })
    );

    let posted = requests
        .iter()
        .find(|request| request.url.path() == format!("/threads/{THREAD}/messages"))
        .unwrap();
    let body: Value = serde_json::from_slice(&posted.body).unwrap();
    assert_eq!(body, json!({ "role": "user", "content": "What is this project?" }));

    assert_eq!(
        fs::read_to_string(work.path().join(SHELL_SCRIPT)).unwrap(),
        format!("#!/bin/zsh\nexport THREAD_ID={THREAD}\n")
    );
    assert_eq!(
        fs::read_to_string(work.path().join(BATCH_SCRIPT)).unwrap(),
        format!("@echo off\nset THREAD_ID={THREAD}\n")
    );
}

#[tokio::test]
async fn every_requires_action_gets_its_own_round() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();
    fs::write(work.path().join("README.md"), "# Demo\n").unwrap();

    mount_conversation(&server, 1).await;
    mount_submit(&server, 2).await;
    mount_statuses(
        &server,
        StatusSequence::new(
            &["requires_action", "in_progress", "requires_action", "completed"],
            read_readme_call(),
        ),
        4,
    )
    .await;

    let response = session(&server, work.path(), 10)
        .chat("Read it twice", None)
        .await
        .unwrap();
    assert_eq!(response.reply().as_deref(), Some("The project is a demo."));

    let submissions: Vec<Value> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path().ends_with("/submit_tool_outputs"))
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect();
    assert_eq!(submissions.len(), 2);
    for body in submissions {
        assert_eq!(
            body,
            json!({ "tool_outputs": [{ "tool_call_id": "call_1", "output": "# Demo\n" }] })
        );
    }
    assert!(work.path().join(SHELL_SCRIPT).exists());
}

#[tokio::test]
async fn failure_after_a_tool_round_is_reported() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();

    mount_conversation(&server, 1).await;
    mount_submit(&server, 1).await;
    mount_statuses(
        &server,
        StatusSequence::new(&["requires_action", "failed"], read_readme_call()),
        2,
    )
    .await;

    let error = session(&server, work.path(), 10)
        .chat("hi", None)
        .await
        .unwrap_err();
    match error {
        AssistantError::RunFailed { code, message } => {
            assert_eq!(code, "rate_limit_exceeded");
            assert_eq!(message, "Slow down");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!work.path().join(SHELL_SCRIPT).exists());
    assert!(!work.path().join(BATCH_SCRIPT).exists());
}

#[tokio::test]
async fn existing_thread_is_reused() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();

    mount_conversation(&server, 0).await;
    mount_submit(&server, 0).await;
    mount_statuses(&server, StatusSequence::new(&["completed"], json!([])), 1).await;

    let response = session(&server, work.path(), 10)
        .chat("again", Some(THREAD))
        .await
        .unwrap();
    assert_eq!(response.thread_id, THREAD);
}

#[tokio::test]
async fn failed_run_reports_code_and_message() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();

    mount_conversation(&server, 1).await;
    mount_statuses(&server, StatusSequence::new(&["in_progress", "failed"], json!([])), 2).await;

    let error = session(&server, work.path(), 10)
        .chat("hi", None)
        .await
        .unwrap_err();
    match error {
        AssistantError::RunFailed { code, message } => {
            assert_eq!(code, "rate_limit_exceeded");
            assert_eq!(message, "Slow down");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!work.path().join(SHELL_SCRIPT).exists());
}

#[tokio::test]
async fn unknown_function_submits_nothing() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();

    mount_conversation(&server, 1).await;
    mount_submit(&server, 0).await;
    mount_statuses(
        &server,
        StatusSequence::new(
            &["requires_action"],
            json!([{
                "id": "call_1",
                "type": "function",
                "function": { "name": "launch_rockets", "arguments": "{}" }
            }]),
        ),
        1,
    )
    .await;

    let error = session(&server, work.path(), 10)
        .chat("hi", None)
        .await
        .unwrap_err();
    assert!(matches!(error, AssistantError::UnknownFunction(name) if name == "launch_rockets"));
    assert!(!work.path().join(BATCH_SCRIPT).exists());
}

#[tokio::test]
async fn polling_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();

    mount_conversation(&server, 1).await;
    mount_statuses(&server, StatusSequence::new(&["in_progress"], json!([])), 3).await;

    let error = session(&server, work.path(), 3)
        .chat("hi", None)
        .await
        .unwrap_err();
    match error {
        AssistantError::PollTimeout {
            run_id,
            status,
            attempts,
        } => {
            assert_eq!(run_id, RUN);
            assert_eq!(status, Status::InProgress);
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_run_is_not_treated_as_success() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();

    mount_conversation(&server, 1).await;
    mount_statuses(&server, StatusSequence::new(&["cancelling", "cancelled"], json!([])), 2).await;

    let error = session(&server, work.path(), 10)
        .chat("hi", None)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        AssistantError::RunEnded {
            status: Status::Cancelled,
            ..
        }
    ));
    assert!(!work.path().join(SHELL_SCRIPT).exists());
}

#[tokio::test]
async fn api_errors_are_decoded() {
    let server = MockServer::start().await;
    let work = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let error = session(&server, work.path(), 10)
        .chat("hi", None)
        .await
        .unwrap_err();
    match error {
        AssistantError::Api(error) => {
            assert_eq!(error.code.as_deref(), Some("invalid_api_key"));
            assert_eq!(error.message, "Incorrect API key provided");
        }
        other => panic!("unexpected error {other:?}"),
    }
}
