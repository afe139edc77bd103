//! Work payload construction shared by all compute backends.
//!
//! Every platform receives the same fields — repository, issue
//! coordinates, labels, and the agent configuration — projected into
//! the shape that platform expects: a JSON document for Lambda,
//! container environment overrides for Fargate, and string job
//! parameters for Batch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use dispatch::{AgentAssignment, IssueEvent};

/// The payload carried to a dispatched agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPayload {
    /// Repository full name (org/repo).
    pub repository: String,
    /// Issue number.
    pub issue_number: u64,
    /// Issue title.
    pub issue_title: String,
    /// Issue body, empty string when absent.
    pub issue_body: String,
    /// Label names on the issue.
    pub labels: Vec<String>,
    /// Agent role name.
    pub agent: String,
    /// Container image the agent runs.
    pub image: String,
    /// Numeric priority, 0 = critical .. 3 = low.
    pub priority: u8,
    /// Execution timeout in minutes.
    pub timeout_minutes: u32,
}

/// One container environment variable override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvPair {
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
}

impl WorkPayload {
    /// Build the payload for one assignment and event.
    #[must_use]
    pub fn from_event(assignment: &AgentAssignment, event: &IssueEvent) -> Self {
        Self {
            repository: event.repository.full_name.clone(),
            issue_number: event.issue.number,
            issue_title: event.issue.title.clone(),
            issue_body: event.issue.body.clone().unwrap_or_default(),
            labels: event.issue.labels.iter().map(|l| l.name.clone()).collect(),
            agent: assignment.role.as_str().to_string(),
            image: assignment.image.clone(),
            priority: assignment.priority.level(),
            timeout_minutes: assignment.timeout_minutes,
        }
    }

    /// Project the payload into container environment overrides.
    #[must_use]
    pub fn env_overrides(&self) -> Vec<EnvPair> {
        fn pair(name: &str, value: impl Into<String>) -> EnvPair {
            EnvPair {
                name: name.to_string(),
                value: value.into(),
            }
        }

        vec![
            pair("REPOSITORY", self.repository.clone()),
            pair("ISSUE_NUMBER", self.issue_number.to_string()),
            pair("ISSUE_TITLE", self.issue_title.clone()),
            pair("ISSUE_BODY", self.issue_body.clone()),
            pair("ISSUE_LABELS", self.labels.join(",")),
            pair("AGENT_NAME", self.agent.clone()),
            pair("AGENT_PRIORITY", self.priority.to_string()),
        ]
    }

    /// Project the payload into Batch job parameters.
    #[must_use]
    pub fn job_parameters(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("repository".to_string(), self.repository.clone());
        params.insert("issue_number".to_string(), self.issue_number.to_string());
        params.insert("issue_title".to_string(), self.issue_title.clone());
        params.insert("agent".to_string(), self.agent.clone());
        params.insert("labels".to_string(), self.labels.join(","));
        params
    }
}
