//! Issue webhook handler and the dispatch pipeline.
//!
//! Each event is processed start-to-finish in one pass: action gate →
//! classify → assignment lookup → one compute dispatch → best-effort
//! notification. No state persists between events and nothing is
//! retried, so a redelivered webhook dispatches duplicate work.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use dispatch::{classify, IssueEvent, NotificationOutcome, TriageResult};

use crate::server::AppState;
use crate::webhooks::{verify_webhook_signature, WebhookHeaders};

/// Handle an incoming GitHub webhook.
///
/// This handler:
/// 1. Verifies the webhook signature (if a secret is configured)
/// 2. Filters to `issues` events
/// 3. Runs the dispatch pipeline and returns its structured result
pub async fn handle_issue_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, StatusCode> {
    if !state.config.enabled {
        debug!("Gateway is disabled, ignoring webhook");
        return Ok(Json(json!({
            "status": "ignored",
            "reason": "gateway_disabled"
        })));
    }

    let parsed = WebhookHeaders::from_header_map(|name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    });

    let event_type = parsed.event_type.as_deref().unwrap_or("unknown");
    let delivery_id = parsed.delivery_id.as_deref().unwrap_or("unknown");

    info!(
        event_type = %event_type,
        delivery_id = %delivery_id,
        "Received GitHub webhook"
    );

    // Verify signature if secret is configured
    if let Some(secret) = &state.config.webhook_secret {
        let Some(signature) = &parsed.signature else {
            warn!("Missing X-Hub-Signature-256 header");
            return Err(StatusCode::UNAUTHORIZED);
        };

        if !verify_webhook_signature(&body, signature, secret) {
            warn!(delivery_id = %delivery_id, "Invalid webhook signature");
            return Err(StatusCode::UNAUTHORIZED);
        }
        debug!("Webhook signature verified");
    }

    if event_type == "ping" {
        return Ok(Json(json!({
            "status": "ignored",
            "reason": "ping_event"
        })));
    }

    if event_type != "issues" {
        debug!(event_type = %event_type, "Ignoring non-issues event");
        return Ok(Json(json!({
            "status": "ignored",
            "reason": "not_issues_event"
        })));
    }

    let event: IssueEvent = serde_json::from_slice(&body).map_err(|e| {
        error!(delivery_id = %delivery_id, error = %e, "Failed to parse issue event");
        StatusCode::BAD_REQUEST
    })?;

    let result = run_pipeline(&state, &event).await;
    to_response(&result)
}

/// Run the dispatch pipeline for one issue event.
///
/// Every path returns a `TriageResult`; dispatch failures are wrapped
/// and notification failures stay advisory.
pub async fn run_pipeline(state: &AppState, event: &IssueEvent) -> TriageResult {
    if !event.action.is_accepted() {
        debug!(
            action = event.action.as_str(),
            issue = event.issue.number,
            "Ignoring unhandled issue action"
        );
        return TriageResult::ignored("unhandled_action");
    }

    let role = classify(event);
    let assignment = state.table.get(role);

    info!(
        issue = event.issue.number,
        repo = %event.repository.full_name,
        agent = %role,
        platform = %assignment.platform,
        priority = %assignment.priority,
        "Issue classified"
    );

    let receipt = match state.dispatcher.dispatch(assignment, event).await {
        Ok(receipt) => receipt,
        Err(e) => {
            error!(
                issue = event.issue.number,
                agent = %role,
                error = %e,
                "Dispatch failed"
            );
            return TriageResult::Failed {
                issue_number: event.issue.number,
                agent_assigned: role.as_str().to_string(),
                error: e.to_string(),
            };
        }
    };

    let notification = match &state.notifier {
        Some(notifier) => match notifier.announce(assignment, event).await {
            Ok(receipt) => {
                info!(
                    issue = event.issue.number,
                    comment_id = receipt.comment_id,
                    "Assignment posted to issue"
                );
                NotificationOutcome::delivered()
            }
            Err(e) => {
                warn!(
                    issue = event.issue.number,
                    error = %e,
                    "Failed to notify issue"
                );
                NotificationOutcome::failed(e.to_string())
            }
        },
        None => {
            debug!("No notifier configured, skipping issue notification");
            NotificationOutcome::skipped()
        }
    };

    let deployment = serde_json::to_value(&receipt).unwrap_or(Value::Null);

    TriageResult::Success {
        issue_number: event.issue.number,
        agent_assigned: role.as_str().to_string(),
        compute_type: assignment.platform,
        deployment,
        notification,
    }
}

/// Serialize a pipeline result into the HTTP response body.
fn to_response(result: &TriageResult) -> Result<Json<Value>, StatusCode> {
    serde_json::to_value(result).map(Json).map_err(|e| {
        error!(error = %e, "Failed to serialize pipeline result");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
