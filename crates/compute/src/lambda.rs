//! Lambda invocation client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use crate::error::ComputeError;
use crate::payload::WorkPayload;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Receipt for a fire-and-forget function invocation.
#[derive(Debug, Clone)]
pub struct LambdaInvocation {
    /// Function that was invoked.
    pub function_name: String,
    /// HTTP status returned by the invoke call (202 for async).
    pub status_code: u16,
    /// Backend request ID, when present.
    pub request_id: Option<String>,
}

/// Client for asynchronous Lambda invocations.
#[derive(Debug, Clone)]
pub struct LambdaClient {
    client: Client,
    endpoint: String,
}

impl LambdaClient {
    /// Create a client for a region.
    pub fn new(region: &str) -> Result<Self, ComputeError> {
        Self::with_endpoint(format!("https://lambda.{region}.amazonaws.com"))
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

    /// Invoke a function asynchronously (fire-and-forget).
    ///
    /// The payload is delivered as the function's JSON event; the call
    /// returns as soon as the backend has queued the invocation.
    pub async fn invoke_async(
        &self,
        function_name: &str,
        payload: &WorkPayload,
    ) -> Result<LambdaInvocation, ComputeError> {
        let url = format!(
            "{}/2015-03-31/functions/{function_name}/invocations",
            self.endpoint
        );

        debug!(function = %function_name, url = %url, "Invoking function");

        let response = self
            .client
            .post(&url)
            .header("X-Amz-Invocation-Type", "Event")
            .header(
                "X-Amz-Date",
                chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string(),
            )
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let request_id = response
            .headers()
            .get("x-amzn-RequestId")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ComputeError::api(status.as_u16(), body));
        }

        info!(
            function = %function_name,
            status = status.as_u16(),
            request_id = ?request_id,
            "Function invocation queued"
        );

        Ok(LambdaInvocation {
            function_name: function_name.to_string(),
            status_code: status.as_u16(),
            request_id,
        })
    }
}
