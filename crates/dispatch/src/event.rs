//! GitHub issue webhook payload models.
//!
//! These are simplified serde models of the `issues` webhook event —
//! only the fields the dispatch pipeline reads. Unknown actions parse
//! into a catch-all variant so a new GitHub action never fails the
//! whole delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Issue webhook action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueAction {
    /// Issue was opened.
    Opened,
    /// Issue was reopened.
    Reopened,
    /// A label was added to the issue.
    Labeled,
    /// Any other action (edited, closed, assigned, ...).
    #[serde(other)]
    Other,
}

impl IssueAction {
    /// Whether this action triggers the dispatch pipeline.
    ///
    /// Accepted actions are exactly {opened, reopened, labeled};
    /// everything else is ignored with no downstream effects.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Opened | Self::Reopened | Self::Labeled)
    }

    /// Get the action name as a lowercase string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Reopened => "reopened",
            Self::Labeled => "labeled",
            Self::Other => "other",
        }
    }
}

/// One inbound issue event. Produced once per webhook delivery and
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueEvent {
    /// Action type (opened, reopened, labeled, ...).
    pub action: IssueAction,
    /// Issue details.
    pub issue: Issue,
    /// Repository the issue belongs to.
    pub repository: Repository,
    /// User who triggered the event.
    #[serde(default)]
    pub sender: Option<Sender>,
    /// When this event was received by the service.
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl IssueEvent {
    /// Lowercased names of all labels on the issue.
    #[must_use]
    pub fn label_names(&self) -> Vec<String> {
        self.issue
            .labels
            .iter()
            .map(|l| l.name.to_lowercase())
            .collect()
    }
}

/// GitHub issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body/description.
    #[serde(default)]
    pub body: Option<String>,
    /// Labels on the issue.
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    /// Issue HTML URL.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// GitHub label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLabel {
    /// Label name.
    pub name: String,
    /// Label color.
    #[serde(default)]
    pub color: Option<String>,
}

/// GitHub repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name.
    pub name: String,
    /// Full name (org/repo).
    pub full_name: String,
    /// Repository HTML URL.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// User who triggered the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sender {
    /// User login.
    pub login: String,
    /// User ID.
    #[serde(default)]
    pub id: u64,
}
