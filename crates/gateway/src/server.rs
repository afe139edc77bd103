//! HTTP server for GitHub issue webhooks.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use compute::Dispatcher;
use dispatch::{AssignmentTable, IssueEvent};

use crate::config::Config;
use crate::handlers::issues::{handle_issue_webhook, run_pipeline};
use crate::notifier::Notifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration.
    pub config: Config,
    /// Role → assignment lookup table.
    pub table: Arc<AssignmentTable>,
    /// Compute backend dispatcher.
    pub dispatcher: Arc<Dispatcher>,
    /// Issue notifier, when a GitHub token is configured.
    pub notifier: Option<Arc<Notifier>>,
}

/// Build the HTTP router for the gateway service.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Webhook endpoint
        .route("/webhooks/github", post(handle_issue_webhook))
        // Manual trigger endpoint for testing
        .route("/trigger/dispatch", post(trigger_dispatch))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Manually trigger the dispatch pipeline for a synthetic issue event.
///
/// Runs the same pipeline as the webhook endpoint minus the signature
/// check.
async fn trigger_dispatch(
    State(state): State<AppState>,
    Json(event): Json<IssueEvent>,
) -> Result<Json<Value>, StatusCode> {
    info!(
        issue = event.issue.number,
        repo = %event.repository.full_name,
        "Manual dispatch trigger requested"
    );

    let result = run_pipeline(&state, &event).await;
    serde_json::to_value(&result)
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Readiness check endpoint.
async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    if !state.config.enabled {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({ "status": "ready" })))
}
