//! ECS `RunTask` client for Fargate dispatch.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ComputeError;
use crate::payload::{EnvPair, WorkPayload};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Container name agent task definitions use for their main container.
const AGENT_CONTAINER_NAME: &str = "agent";

/// ECS JSON-RPC target for `RunTask`.
const RUN_TASK_TARGET: &str = "AmazonEC2ContainerServiceV20141113.RunTask";

/// Receipt for a started Fargate task.
#[derive(Debug, Clone)]
pub struct EcsTask {
    /// ARN of the started task.
    pub task_arn: String,
    /// Cluster the task runs in.
    pub cluster: String,
}

/// `RunTask` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunTaskRequest {
    cluster: String,
    task_definition: String,
    launch_type: String,
    count: u32,
    started_by: String,
    overrides: TaskOverride,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskOverride {
    cpu: String,
    memory: String,
    container_overrides: Vec<ContainerOverride>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerOverride {
    name: String,
    environment: Vec<EnvPair>,
    cpu: u32,
    memory: u32,
}

/// `RunTask` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunTaskResponse {
    #[serde(default)]
    tasks: Vec<TaskDescription>,
    #[serde(default)]
    failures: Vec<TaskFailure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDescription {
    task_arn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskFailure {
    #[serde(default)]
    arn: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Client for running Fargate tasks.
#[derive(Debug, Clone)]
pub struct EcsClient {
    client: Client,
    endpoint: String,
}

impl EcsClient {
    /// Create a client for a region.
    pub fn new(region: &str) -> Result<Self, ComputeError> {
        Self::with_endpoint(format!("https://ecs.{region}.amazonaws.com"))
    }

    /// Create a client against an explicit endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ComputeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ComputeError::Http)?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Run one Fargate task with the payload as container environment
    /// overrides, plus cpu/memory overrides from the assignment.
    pub async fn run_task(
        &self,
        cluster: &str,
        task_definition: &str,
        payload: &WorkPayload,
        cpu_units: u32,
        memory_mb: u32,
    ) -> Result<EcsTask, ComputeError> {
        let request = RunTaskRequest {
            cluster: cluster.to_string(),
            task_definition: task_definition.to_string(),
            launch_type: "FARGATE".to_string(),
            count: 1,
            started_by: format!("relay-issue-{}", payload.issue_number),
            overrides: TaskOverride {
                cpu: cpu_units.to_string(),
                memory: memory_mb.to_string(),
                container_overrides: vec![ContainerOverride {
                    name: AGENT_CONTAINER_NAME.to_string(),
                    environment: payload.env_overrides(),
                    cpu: cpu_units,
                    memory: memory_mb,
                }],
            },
        };

        debug!(
            cluster = %cluster,
            task_definition = %task_definition,
            issue = payload.issue_number,
            "Running Fargate task"
        );

        let response = self
            .client
            .post(format!("{}/", self.endpoint))
            .header("X-Amz-Target", RUN_TASK_TARGET)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header(
                "X-Amz-Date",
                chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string(),
            )
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ComputeError::api(status.as_u16(), body));
        }

        let parsed: RunTaskResponse = response.json().await?;

        if let Some(failure) = parsed.failures.first() {
            let reason = failure.reason.clone().unwrap_or_else(|| "unknown".to_string());
            let arn = failure.arn.clone().unwrap_or_default();
            return Err(ComputeError::api(
                status.as_u16(),
                format!("RunTask failure: {reason} {arn}"),
            ));
        }

        let task = parsed
            .tasks
            .into_iter()
            .next()
            .ok_or_else(|| ComputeError::api(status.as_u16(), "RunTask returned no tasks"))?;

        info!(
            cluster = %cluster,
            task_arn = %task.task_arn,
            issue = payload.issue_number,
            "Fargate task started"
        );

        Ok(EcsTask {
            task_arn: task.task_arn,
            cluster: cluster.to_string(),
        })
    }
}
