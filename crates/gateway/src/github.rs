//! GitHub API client for issue comments and labels.

use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

const GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub API client for issue write calls.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

/// A created issue comment.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    /// Comment ID.
    pub id: u64,
    /// Comment HTML URL.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// A label as returned by the labels endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AddedLabel {
    /// Label name.
    pub name: String,
}

/// Request to create a comment.
#[derive(Debug, Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

/// Request to add labels.
#[derive(Debug, Serialize)]
struct AddLabelsRequest<'a> {
    labels: &'a [String],
}

impl GitHubClient {
    /// Create a new GitHub client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Create a client against an explicit API base URL (GitHub
    /// Enterprise, tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("relay-gateway/1.0"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Post a comment on an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn add_comment(
        &self,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<IssueComment> {
        let url = format!(
            "{}/repos/{repo}/issues/{issue_number}/comments",
            self.base_url
        );

        debug!(repo = %repo, issue = issue_number, "Posting issue comment");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&CreateCommentRequest { body })
            .send()
            .await
            .context("Failed to send create comment request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GitHub API error creating comment: {status} - {body}"));
        }

        response
            .json()
            .await
            .context("Failed to parse create comment response")
    }

    /// Add labels to an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn add_labels(
        &self,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> Result<Vec<AddedLabel>> {
        let url = format!(
            "{}/repos/{repo}/issues/{issue_number}/labels",
            self.base_url
        );

        debug!(repo = %repo, issue = issue_number, labels = ?labels, "Adding issue labels");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&AddLabelsRequest { labels })
            .send()
            .await
            .context("Failed to send add labels request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GitHub API error adding labels: {status} - {body}"));
        }

        response
            .json()
            .await
            .context("Failed to parse add labels response")
    }
}
