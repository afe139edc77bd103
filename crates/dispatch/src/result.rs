//! Pipeline result types.
//!
//! Every path through the dispatch pipeline produces a `TriageResult`
//! rather than an error — classification cannot fail, dispatch failures
//! are wrapped, and notification failures stay advisory.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assignment::ComputePlatform;

/// Outcome of the best-effort issue-tracker notification.
///
/// Notification failure never changes the dispatch status; callers that
/// want to treat it as fatal can inspect this instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationOutcome {
    /// Whether the comment and labels were posted.
    pub delivered: bool,
    /// Failure detail when delivery did not happen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationOutcome {
    /// Comment and labels landed on the issue.
    #[must_use]
    pub const fn delivered() -> Self {
        Self {
            delivered: true,
            error: None,
        }
    }

    /// Delivery was attempted and failed.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            delivered: false,
            error: Some(error.into()),
        }
    }

    /// No notifier is configured; nothing was attempted.
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            delivered: false,
            error: Some("notifier not configured".to_string()),
        }
    }
}

/// Result of processing one issue event, serialized as the pipeline's
/// HTTP response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TriageResult {
    /// Work was dispatched to a compute backend.
    Success {
        /// Issue number the dispatch belongs to.
        issue_number: u64,
        /// Role the issue classified to.
        agent_assigned: String,
        /// Platform the work was dispatched to.
        compute_type: ComputePlatform,
        /// Backend-specific receipt (function / task / job identifiers).
        deployment: Value,
        /// Advisory notification outcome.
        notification: NotificationOutcome,
    },

    /// Event was ignored with no downstream effects.
    Ignored {
        /// Why the event was ignored.
        reason: String,
    },

    /// The compute dispatch call failed. Not retried.
    Failed {
        /// Issue number the dispatch belonged to.
        issue_number: u64,
        /// Role the issue classified to.
        agent_assigned: String,
        /// Wrapped backend error message.
        error: String,
    },

    /// The pipeline itself could not run (bad payload, missing config).
    Error {
        /// Error detail.
        error: String,
    },
}

impl TriageResult {
    /// Shorthand for an ignored result.
    #[must_use]
    pub fn ignored(reason: impl Into<String>) -> Self {
        Self::Ignored {
            reason: reason.into(),
        }
    }

    /// Status string as serialized in the response body.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Ignored { .. } => "ignored",
            Self::Failed { .. } => "failed",
            Self::Error { .. } => "error",
        }
    }
}
