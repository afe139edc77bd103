//! End-to-end pipeline tests for the gateway service.
//!
//! These tests run the real router against mock compute and GitHub
//! endpoints and verify the contract of the webhook surface: action
//! gating, platform exactness, duplicate delivery behavior, signature
//! verification, and advisory notification failures.

use std::net::SocketAddr;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use compute::{ComputeConfig, Dispatcher};
use dispatch::AssignmentTable;
use gateway::{build_router, AppState, Config, GitHubClient, Notifier};

// =============================================================================
// Harness
// =============================================================================

fn test_config(compute_uri: &str, secret: Option<&str>) -> Config {
    Config {
        port: 0,
        enabled: true,
        webhook_secret: secret.map(String::from),
        github_token: None,
        github_api_url: None,
        assignment_table_path: None,
        compute: ComputeConfig {
            region: "us-east-1".to_string(),
            resource_prefix: "relay-agent".to_string(),
            ecs_cluster: "relay-agents".to_string(),
            batch_queue: "relay-agents".to_string(),
            lambda_endpoint: Some(compute_uri.to_string()),
            ecs_endpoint: Some(compute_uri.to_string()),
            batch_endpoint: Some(compute_uri.to_string()),
        },
    }
}

fn build_state(config: Config, github_uri: Option<&str>) -> AppState {
    let dispatcher = Dispatcher::from_config(config.compute.clone()).unwrap();
    let notifier = github_uri.map(|uri| {
        let github = GitHubClient::with_base_url("test-token", uri).unwrap();
        Arc::new(Notifier::new(github))
    });

    AppState {
        config,
        table: Arc::new(AssignmentTable::default()),
        dispatcher: Arc::new(dispatcher),
        notifier,
    }
}

async fn spawn_gateway(state: AppState) -> SocketAddr {
    let app = build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Mount compute mocks that accept any dispatch.
async fn mount_compute_mocks(server: &MockServer) {
    // Fargate RunTask
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header(
            "X-Amz-Target",
            "AmazonEC2ContainerServiceV20141113.RunTask",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tasks": [{"taskArn": "arn:aws:ecs:task/abc"}],
            "failures": []
        })))
        .mount(server)
        .await;

    // Batch SubmitJob
    Mock::given(method("POST"))
        .and(path("/v1/submitjob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobId": "9f3c",
            "jobName": "job"
        })))
        .mount(server)
        .await;

    // Lambda invoke (any function)
    Mock::given(method("POST"))
        .and(wiremock::matchers::path_regex(
            r"^/2015-03-31/functions/.+/invocations$",
        ))
        .respond_with(ResponseTemplate::new(202))
        .mount(server)
        .await;
}

fn issues_payload(action: &str, number: u64, labels: &[&str], title: &str) -> Value {
    json!({
        "action": action,
        "issue": {
            "number": number,
            "title": title,
            "body": "",
            "labels": labels.iter().map(|l| json!({"name": l})).collect::<Vec<_>>(),
            "html_url": format!("https://github.com/5dlabs/relay/issues/{number}")
        },
        "repository": {
            "name": "relay",
            "full_name": "5dlabs/relay"
        },
        "sender": {"login": "octocat", "id": 1}
    })
}

async fn post_webhook(addr: SocketAddr, payload: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/webhooks/github"))
        .header("X-GitHub-Event", "issues")
        .header("X-GitHub-Delivery", "delivery-1")
        .json(payload)
        .send()
        .await
        .unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn bug_label_dispatches_developer_to_fargate() {
    let backends = MockServer::start().await;
    mount_compute_mocks(&backends).await;

    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;
    let response = post_webhook(addr, &issues_payload("opened", 42, &["bug"], "random")).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["issue_number"], 42);
    assert_eq!(body["agent_assigned"], "developer");
    assert_eq!(body["compute_type"], "fargate");
    assert_eq!(body["deployment"]["platform"], "fargate");

    // Exactly one RunTask call, carrying ISSUE_NUMBER in the env.
    let requests = backends.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let run_task: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let env = run_task["overrides"]["containerOverrides"][0]["environment"]
        .as_array()
        .unwrap();
    assert!(env
        .iter()
        .any(|p| p["name"] == "ISSUE_NUMBER" && p["value"] == "42"));
}

#[tokio::test]
async fn security_title_classifies_security_with_priority_zero() {
    let backends = MockServer::start().await;
    mount_compute_mocks(&backends).await;

    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;
    let payload = issues_payload("opened", 7, &[], "Fix authentication vulnerability");
    let response = post_webhook(addr, &payload).await;

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["agent_assigned"], "security");
    assert_eq!(body["compute_type"], "fargate");

    // Security profile is critical priority.
    let requests = backends.received_requests().await.unwrap();
    let run_task: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let env = run_task["overrides"]["containerOverrides"][0]["environment"]
        .as_array()
        .unwrap();
    assert!(env
        .iter()
        .any(|p| p["name"] == "AGENT_PRIORITY" && p["value"] == "0"));
}

#[tokio::test]
async fn unhandled_action_is_ignored_with_no_side_effects() {
    let backends = MockServer::start().await;
    let github = MockServer::start().await;

    // No mocks mounted with expectations — any request would 404, and we
    // assert zero requests arrived at either backend.
    let state = build_state(test_config(&backends.uri(), None), Some(&github.uri()));
    let addr = spawn_gateway(state).await;

    let response = post_webhook(addr, &issues_payload("closed", 5, &["bug"], "t")).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["reason"], "unhandled_action");

    assert!(backends.received_requests().await.unwrap().is_empty());
    assert!(github.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_issues_event_is_ignored() {
    let backends = MockServer::start().await;
    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhooks/github"))
        .header("X-GitHub-Event", "pull_request")
        .json(&json!({"action": "opened"}))
        .send()
        .await
        .unwrap();

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["reason"], "not_issues_event");
    assert!(backends.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn ping_event_is_acknowledged() {
    let backends = MockServer::start().await;
    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhooks/github"))
        .header("X-GitHub-Event", "ping")
        .json(&json!({"zen": "Design for failure."}))
        .send()
        .await
        .unwrap();

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["reason"], "ping_event");
}

#[tokio::test]
async fn duplicate_delivery_dispatches_twice() {
    let backends = MockServer::start().await;
    mount_compute_mocks(&backends).await;

    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;
    let payload = issues_payload("opened", 42, &["bug"], "random");

    // Same event delivered twice — no deduplication, two dispatches.
    let first: Value = post_webhook(addr, &payload).await.json().await.unwrap();
    let second: Value = post_webhook(addr, &payload).await.json().await.unwrap();
    assert_eq!(first["status"], "success");
    assert_eq!(second["status"], "success");

    assert_eq!(backends.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_signature_is_rejected() {
    let backends = MockServer::start().await;
    let state = build_state(test_config(&backends.uri(), Some("test-secret")), None);
    let addr = spawn_gateway(state).await;

    let payload = issues_payload("opened", 1, &["bug"], "t");

    // Missing signature
    let response = post_webhook(addr, &payload).await;
    assert_eq!(response.status(), 401);

    // Wrong signature
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhooks/github"))
        .header("X-GitHub-Event", "issues")
        .header(
            "X-Hub-Signature-256",
            "sha256=0000000000000000000000000000000000000000000000000000000000000000",
        )
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    assert!(backends.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn valid_signature_is_accepted() {
    let backends = MockServer::start().await;
    mount_compute_mocks(&backends).await;

    let secret = "test-secret";
    let state = build_state(test_config(&backends.uri(), Some(secret)), None);
    let addr = spawn_gateway(state).await;

    let payload = issues_payload("opened", 1, &["bug"], "t");
    let body = serde_json::to_vec(&payload).unwrap();

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(&body);
    let signature = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhooks/github"))
        .header("X-GitHub-Event", "issues")
        .header("X-Hub-Signature-256", signature)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn notification_is_posted_on_success() {
    let backends = MockServer::start().await;
    mount_compute_mocks(&backends).await;

    let github = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/5dlabs/relay/issues/42/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1001})))
        .expect(1)
        .mount(&github)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/5dlabs/relay/issues/42/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "agent-dispatched"},
            {"name": "agent:developer"}
        ])))
        .expect(1)
        .mount(&github)
        .await;

    let state = build_state(test_config(&backends.uri(), None), Some(&github.uri()));
    let addr = spawn_gateway(state).await;

    let response = post_webhook(addr, &issues_payload("opened", 42, &["bug"], "random")).await;
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["notification"]["delivered"], true);
}

#[tokio::test]
async fn notification_failure_is_advisory() {
    let backends = MockServer::start().await;
    mount_compute_mocks(&backends).await;

    let github = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&github)
        .await;

    let state = build_state(test_config(&backends.uri(), None), Some(&github.uri()));
    let addr = spawn_gateway(state).await;

    let response = post_webhook(addr, &issues_payload("opened", 42, &["bug"], "random")).await;
    let body: Value = response.json().await.unwrap();

    // Dispatch succeeded; the failed notification stays advisory.
    assert_eq!(body["status"], "success");
    assert_eq!(body["notification"]["delivered"], false);
    assert!(body["notification"]["error"]
        .as_str()
        .unwrap()
        .contains("comment"));
}

#[tokio::test]
async fn dispatch_failure_returns_failed_status() {
    let backends = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("service down"))
        .mount(&backends)
        .await;

    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;
    let response = post_webhook(addr, &issues_payload("opened", 9, &["bug"], "t")).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "failed");
    assert_eq!(body["issue_number"], 9);
    assert_eq!(body["agent_assigned"], "developer");
    assert!(body["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn devops_label_routes_to_batch() {
    let backends = MockServer::start().await;
    mount_compute_mocks(&backends).await;

    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;
    let response = post_webhook(addr, &issues_payload("labeled", 3, &["devops"], "t")).await;

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["agent_assigned"], "devops");
    assert_eq!(body["compute_type"], "batch");
    assert_eq!(body["deployment"]["job_id"], "9f3c");

    let requests = backends.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/v1/submitjob");
}

#[tokio::test]
async fn docs_label_routes_to_lambda() {
    let backends = MockServer::start().await;
    mount_compute_mocks(&backends).await;

    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;
    let response = post_webhook(addr, &issues_payload("opened", 8, &["docs"], "t")).await;

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["agent_assigned"], "docs");
    assert_eq!(body["compute_type"], "lambda");

    let requests = backends.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.path(),
        "/2015-03-31/functions/relay-agent-docs/invocations"
    );
}

#[tokio::test]
async fn trigger_endpoint_runs_pipeline() {
    let backends = MockServer::start().await;
    mount_compute_mocks(&backends).await;

    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/trigger/dispatch"))
        .json(&issues_payload("opened", 13, &["bug"], "manual test"))
        .send()
        .await
        .unwrap();

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["issue_number"], 13);
}

#[tokio::test]
async fn disabled_gateway_ignores_webhooks_and_reports_unready() {
    let backends = MockServer::start().await;
    let mut config = test_config(&backends.uri(), None);
    config.enabled = false;
    let addr = spawn_gateway(build_state(config, None)).await;

    let response = post_webhook(addr, &issues_payload("opened", 1, &["bug"], "t")).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["reason"], "gateway_disabled");

    let ready = reqwest::get(format!("http://{addr}/ready")).await.unwrap();
    assert_eq!(ready.status(), 503);

    assert!(backends.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn health_endpoints_respond() {
    let backends = MockServer::start().await;
    let addr = spawn_gateway(build_state(test_config(&backends.uri(), None), None)).await;

    let health = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(health.status(), 200);

    let ready = reqwest::get(format!("http://{addr}/ready")).await.unwrap();
    assert_eq!(ready.status(), 200);
}
