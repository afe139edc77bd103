//! Batch `SubmitJob` client.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ComputeError;
use crate::payload::WorkPayload;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Receipt for a submitted batch job.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Job ID assigned by the queue.
    pub job_id: String,
    /// Job name as submitted.
    pub job_name: String,
}

/// `SubmitJob` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitJobRequest {
    job_name: String,
    job_queue: String,
    job_definition: String,
    parameters: HashMap<String, String>,
    timeout: JobTimeout,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobTimeout {
    attempt_duration_seconds: u32,
}

/// `SubmitJob` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitJobResponse {
    job_id: String,
    job_name: String,
}

/// Client for submitting batch jobs.
#[derive(Debug, Clone)]
pub struct BatchClient {
    client: Client,
    endpoint: String,
}

impl BatchClient {
    /// Create a client for a region.
    pub fn new(region: &str) -> Result<Self, ComputeError> {
        Self::with_endpoint(format!("https://batch.{region}.amazonaws.com"))
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

    /// Submit one job carrying the payload as job parameters.
    ///
    /// The job-level timeout is the assignment's `timeout_minutes`
    /// converted to seconds.
    pub async fn submit_job(
        &self,
        job_queue: &str,
        job_definition: &str,
        payload: &WorkPayload,
    ) -> Result<BatchJob, ComputeError> {
        let suffix = Uuid::new_v4().simple().to_string();
        let job_name = format!(
            "{}-issue-{}-{}",
            payload.agent,
            payload.issue_number,
            &suffix[..8]
        );

        let request = SubmitJobRequest {
            job_name: job_name.clone(),
            job_queue: job_queue.to_string(),
            job_definition: job_definition.to_string(),
            parameters: payload.job_parameters(),
            timeout: JobTimeout {
                attempt_duration_seconds: payload.timeout_minutes * 60,
            },
        };

        debug!(
            job_name = %job_name,
            job_queue = %job_queue,
            issue = payload.issue_number,
            "Submitting batch job"
        );

        let response = self
            .client
            .post(format!("{}/v1/submitjob", self.endpoint))
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

        let parsed: SubmitJobResponse = response.json().await?;

        info!(
            job_id = %parsed.job_id,
            job_name = %parsed.job_name,
            "Batch job submitted"
        );

        Ok(BatchJob {
            job_id: parsed.job_id,
            job_name: parsed.job_name,
        })
    }
}
