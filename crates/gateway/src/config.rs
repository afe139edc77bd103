//! Configuration for the Relay gateway service.

use std::env;

use compute::ComputeConfig;

/// Gateway configuration, read from the environment.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Whether the service processes webhooks.
    pub enabled: bool,
    /// Webhook signing secret for signature verification.
    pub webhook_secret: Option<String>,
    /// GitHub token for comment and label calls.
    pub github_token: Option<String>,
    /// GitHub API base URL override (GitHub Enterprise, tests).
    pub github_api_url: Option<String>,
    /// Path to a YAML assignment table replacing the built-in rows.
    pub assignment_table_path: Option<String>,
    /// Compute backend settings.
    pub compute: ComputeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("RELAY_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            enabled: env::var("RELAY_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            webhook_secret: env::var("GITHUB_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            github_token: env::var("GITHUB_TOKEN").ok(),
            github_api_url: env::var("GITHUB_API_URL").ok(),
            assignment_table_path: env::var("RELAY_ASSIGNMENTS").ok(),
            compute: ComputeConfig::default(),
        }
    }
}
