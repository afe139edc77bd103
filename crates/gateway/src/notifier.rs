//! Assignment notification back to the originating issue.
//!
//! Best-effort: the pipeline reports notification failures alongside
//! the dispatch result instead of letting them change its status.

use thiserror::Error;
use tracing::debug;

use dispatch::{AgentAssignment, IssueEvent};

use crate::github::GitHubClient;

/// Label applied to every dispatched issue.
const DISPATCH_LABEL: &str = "agent-dispatched";

/// Errors that can occur while notifying an issue.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The assignment comment could not be posted.
    #[error("failed to post assignment comment: {0}")]
    Comment(String),

    /// The labels could not be applied.
    #[error("failed to apply labels: {0}")]
    Labels(String),
}

/// Receipt for a delivered notification.
#[derive(Debug, Clone)]
pub struct NotifyReceipt {
    /// ID of the posted comment.
    pub comment_id: u64,
    /// Labels applied to the issue.
    pub labels: Vec<String>,
}

/// Posts assignment comments and labels back to the issue tracker.
pub struct Notifier {
    github: GitHubClient,
}

impl Notifier {
    /// Create a notifier over a GitHub client.
    #[must_use]
    pub fn new(github: GitHubClient) -> Self {
        Self { github }
    }

    /// Labels describing an assignment.
    #[must_use]
    pub fn labels_for(assignment: &AgentAssignment) -> Vec<String> {
        vec![
            DISPATCH_LABEL.to_string(),
            format!("agent:{}", assignment.role),
        ]
    }

    /// Format the assignment comment body.
    #[must_use]
    pub fn format_comment(assignment: &AgentAssignment, event: &IssueEvent) -> String {
        format!(
            "## Agent Assigned 🤖\n\n\
             **Agent:** {} (`{}`)\n\
             **Compute:** {}\n\
             **Priority:** {}\n\
             **Timeout:** {} minutes\n\n\
             {} has been dispatched for issue #{} and will report back here.",
            assignment.display_name,
            assignment.role,
            assignment.platform,
            assignment.priority,
            assignment.timeout_minutes,
            assignment.display_name,
            event.issue.number,
        )
    }

    /// Post the assignment comment, then apply the label set.
    ///
    /// # Errors
    ///
    /// Returns a `NotifyError` naming the step that failed; the caller
    /// decides whether that is fatal or advisory.
    pub async fn announce(
        &self,
        assignment: &AgentAssignment,
        event: &IssueEvent,
    ) -> Result<NotifyReceipt, NotifyError> {
        let repo = &event.repository.full_name;
        let comment_body = Self::format_comment(assignment, event);

        let comment = self
            .github
            .add_comment(repo, event.issue.number, &comment_body)
            .await
            .map_err(|e| NotifyError::Comment(format!("{e:#}")))?;

        let labels = Self::labels_for(assignment);
        self.github
            .add_labels(repo, event.issue.number, &labels)
            .await
            .map_err(|e| NotifyError::Labels(format!("{e:#}")))?;

        debug!(
            repo = %repo,
            issue = event.issue.number,
            comment_id = comment.id,
            "Assignment notification delivered"
        );

        Ok(NotifyReceipt {
            comment_id: comment.id,
            labels,
        })
    }
}
