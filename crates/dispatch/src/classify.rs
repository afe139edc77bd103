//! Issue classification — ordered rule tables mapping an inbound issue
//! to exactly one agent role.
//!
//! Strict precedence, first match wins, case-insensitive:
//! 1. exact label match against the label → role table;
//! 2. substring match of per-role keyword lists against the title;
//! 3. substring match of a smaller keyword set against the body;
//! 4. default to `developer`.
//!
//! An issue carrying both a matching label and a conflicting title
//! keyword always resolves by label. Label rules are scanned in table
//! declaration order (not payload label order), so simultaneous label
//! matches resolve deterministically with the most critical roles
//! first.

use crate::assignment::AgentRole;
use crate::event::IssueEvent;

/// Label → role rules, scanned in declaration order.
const LABEL_RULES: &[(&str, AgentRole)] = &[
    ("security", AgentRole::Security),
    ("vulnerability", AgentRole::Security),
    ("devops", AgentRole::Devops),
    ("infrastructure", AgentRole::Devops),
    ("deployment", AgentRole::Devops),
    ("frontend", AgentRole::Frontend),
    ("ui", AgentRole::Frontend),
    ("test", AgentRole::Qa),
    ("qa", AgentRole::Qa),
    ("documentation", AgentRole::Docs),
    ("docs", AgentRole::Docs),
    ("support", AgentRole::Support),
    ("question", AgentRole::Support),
    ("bug", AgentRole::Developer),
    ("feature", AgentRole::Developer),
    ("enhancement", AgentRole::Developer),
];

/// Per-role title keyword lists, scanned in declaration order.
const TITLE_RULES: &[(AgentRole, &[&str])] = &[
    (
        AgentRole::Security,
        &["security", "vulnerability", "auth", "cve", "exploit", "xss", "injection"],
    ),
    (
        AgentRole::Devops,
        &["deploy", "docker", "kubernetes", "k8s", "ci/cd", "pipeline", "terraform", "helm"],
    ),
    (
        AgentRole::Qa,
        &["test", "flaky", "regression", "coverage"],
    ),
    (
        AgentRole::Frontend,
        &["frontend", " ui", "ui ", "css", "react", "layout", "styling"],
    ),
    (
        AgentRole::Docs,
        &["docs", "documentation", "readme", "typo"],
    ),
    (
        AgentRole::Support,
        &["help", "support", "question", "how to"],
    ),
];

/// Body keyword rules — a smaller set than the title tables.
const BODY_RULES: &[(&str, AgentRole)] = &[
    ("test", AgentRole::Qa),
    ("deploy", AgentRole::Devops),
    ("security", AgentRole::Security),
    ("support", AgentRole::Support),
];

/// Classify an issue event to exactly one agent role.
///
/// Never fails — the default role is `Developer`.
#[must_use]
pub fn classify(event: &IssueEvent) -> AgentRole {
    let labels = event.label_names();
    if let Some(role) = match_labels(&labels) {
        return role;
    }

    if let Some(role) = match_title(&event.issue.title) {
        return role;
    }

    if let Some(role) = match_body(event.issue.body.as_deref().unwrap_or("")) {
        return role;
    }

    AgentRole::Developer
}

/// Exact label match, scanned in rule declaration order.
fn match_labels(labels: &[String]) -> Option<AgentRole> {
    LABEL_RULES
        .iter()
        .find(|(label, _)| labels.iter().any(|l| l == label))
        .map(|&(_, role)| role)
}

/// Substring match of per-role keyword lists against the title.
fn match_title(title: &str) -> Option<AgentRole> {
    let title = title.to_lowercase();
    TITLE_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        .map(|&(role, _)| role)
}

/// Substring match against the body.
fn match_body(body: &str) -> Option<AgentRole> {
    let body = body.to_lowercase();
    BODY_RULES
        .iter()
        .find(|(keyword, _)| body.contains(keyword))
        .map(|&(_, role)| role)
}
