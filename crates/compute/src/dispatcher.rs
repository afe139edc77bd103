//! Platform dispatch over the three backend clients.
//!
//! The dispatcher performs exactly one external invocation per event,
//! selected by exhaustive match on the assignment's platform — there is
//! no string branching, so an unhandled platform is a compile error.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dispatch::{AgentAssignment, AgentRole, ComputePlatform, IssueEvent};

use crate::batch::BatchClient;
use crate::error::ComputeError;
use crate::fargate::EcsClient;
use crate::lambda::LambdaClient;
use crate::payload::WorkPayload;

/// Compute backend configuration.
#[derive(Debug, Clone)]
pub struct ComputeConfig {
    /// Backend region (e.g. "us-east-1").
    pub region: String,
    /// Prefix for per-role functions, task definitions, and job
    /// definitions (e.g. "relay-agent" → "relay-agent-developer").
    pub resource_prefix: String,
    /// ECS cluster for Fargate tasks.
    pub ecs_cluster: String,
    /// Batch job queue.
    pub batch_queue: String,
    /// Lambda endpoint override (tests, private gateways).
    pub lambda_endpoint: Option<String>,
    /// ECS endpoint override.
    pub ecs_endpoint: Option<String>,
    /// Batch endpoint override.
    pub batch_endpoint: Option<String>,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            resource_prefix: env::var("RELAY_RESOURCE_PREFIX")
                .unwrap_or_else(|_| "relay-agent".to_string()),
            ecs_cluster: env::var("RELAY_ECS_CLUSTER")
                .unwrap_or_else(|_| "relay-agents".to_string()),
            batch_queue: env::var("RELAY_BATCH_QUEUE")
                .unwrap_or_else(|_| "relay-agents".to_string()),
            lambda_endpoint: env::var("RELAY_LAMBDA_ENDPOINT").ok(),
            ecs_endpoint: env::var("RELAY_ECS_ENDPOINT").ok(),
            batch_endpoint: env::var("RELAY_BATCH_ENDPOINT").ok(),
        }
    }
}

/// Backend-specific receipt for one dispatched unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum DispatchReceipt {
    /// Async function invocation was queued.
    Lambda {
        /// Function that was invoked.
        function: String,
        /// Backend request ID, when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    /// Fargate task was started.
    Fargate {
        /// ARN of the started task.
        task_arn: String,
        /// Cluster the task runs in.
        cluster: String,
    },
    /// Batch job was submitted.
    Batch {
        /// Job ID assigned by the queue.
        job_id: String,
        /// Job name as submitted.
        job_name: String,
    },
}

/// Dispatches one unit of work to the platform an assignment names.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    lambda: LambdaClient,
    ecs: EcsClient,
    batch: BatchClient,
    config: ComputeConfig,
}

impl Dispatcher {
    /// Build a dispatcher from configuration.
    pub fn from_config(config: ComputeConfig) -> Result<Self, ComputeError> {
        let lambda = match &config.lambda_endpoint {
            Some(endpoint) => LambdaClient::with_endpoint(endpoint.clone())?,
            None => LambdaClient::new(&config.region)?,
        };
        let ecs = match &config.ecs_endpoint {
            Some(endpoint) => EcsClient::with_endpoint(endpoint.clone())?,
            None => EcsClient::new(&config.region)?,
        };
        let batch = match &config.batch_endpoint {
            Some(endpoint) => BatchClient::with_endpoint(endpoint.clone())?,
            None => BatchClient::new(&config.region)?,
        };

        Ok(Self {
            lambda,
            ecs,
            batch,
            config,
        })
    }

    /// Per-role resource name ("relay-agent-developer").
    fn resource_name(&self, role: AgentRole) -> String {
        format!("{}-{}", self.config.resource_prefix, role.as_str())
    }

    /// Perform exactly one external invocation matching the
    /// assignment's platform.
    ///
    /// Errors are returned to the caller for logging and wrapping;
    /// there is no retry and no idempotency key, so redelivered events
    /// dispatch duplicate work.
    pub async fn dispatch(
        &self,
        assignment: &AgentAssignment,
        event: &IssueEvent,
    ) -> Result<DispatchReceipt, ComputeError> {
        let payload = WorkPayload::from_event(assignment, event);
        let resource = self.resource_name(assignment.role);

        debug!(
            agent = %assignment.role,
            platform = %assignment.platform,
            resource = %resource,
            issue = event.issue.number,
            "Dispatching work"
        );

        match assignment.platform {
            ComputePlatform::Lambda => {
                let invocation = self.lambda.invoke_async(&resource, &payload).await?;
                Ok(DispatchReceipt::Lambda {
                    function: invocation.function_name,
                    request_id: invocation.request_id,
                })
            }
            ComputePlatform::Fargate => {
                let task = self
                    .ecs
                    .run_task(
                        &self.config.ecs_cluster,
                        &resource,
                        &payload,
                        assignment.cpu_units,
                        assignment.memory_mb,
                    )
                    .await?;
                Ok(DispatchReceipt::Fargate {
                    task_arn: task.task_arn,
                    cluster: task.cluster,
                })
            }
            ComputePlatform::Batch => {
                let job = self
                    .batch
                    .submit_job(&self.config.batch_queue, &resource, &payload)
                    .await?;
                Ok(DispatchReceipt::Batch {
                    job_id: job.job_id,
                    job_name: job.job_name,
                })
            }
        }
    }
}
