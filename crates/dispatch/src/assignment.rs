//! Agent roles and the static role → compute assignment table.
//!
//! One `AgentAssignment` row exists per known role; the table is
//! read-only at runtime. Built-in defaults can be replaced wholesale by
//! a YAML file so resource profiles live in one externally loaded
//! structure instead of per-service literals.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Named category of automated worker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// General implementation work (default).
    Developer,
    /// UI and styling work.
    Frontend,
    /// Vulnerabilities, auth, hardening.
    Security,
    /// Deployment, CI/CD, infrastructure.
    Devops,
    /// Test failures, flakes, coverage.
    Qa,
    /// Documentation changes.
    Docs,
    /// Usage questions and triage help.
    Support,
}

impl AgentRole {
    /// Every known role, in a fixed order. Used to validate table
    /// totality.
    pub const ALL: [Self; 7] = [
        Self::Developer,
        Self::Frontend,
        Self::Security,
        Self::Devops,
        Self::Qa,
        Self::Docs,
        Self::Support,
    ];

    /// Get the role name as a lowercase string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Developer => "developer",
            Self::Frontend => "frontend",
            Self::Security => "security",
            Self::Devops => "devops",
            Self::Qa => "qa",
            Self::Docs => "docs",
            Self::Support => "support",
        }
    }

    /// Get the role description for this agent.
    #[must_use]
    pub const fn role_description(self) -> &'static str {
        match self {
            Self::Developer => "Software engineer handling bug fixes and feature work",
            Self::Frontend => "Frontend engineer handling UI and styling issues",
            Self::Security => "Security engineer handling vulnerabilities and auth issues",
            Self::Devops => "DevOps engineer handling deployment and infrastructure issues",
            Self::Qa => "QA engineer handling test failures and coverage gaps",
            Self::Docs => "Technical writer handling documentation issues",
            Self::Support => "Support engineer handling usage questions",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External execution backend for dispatched work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputePlatform {
    /// Asynchronous function invocation.
    Lambda,
    /// Managed container task.
    Fargate,
    /// Batch job queue.
    Batch,
}

impl ComputePlatform {
    /// Get the platform name as a lowercase string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lambda => "lambda",
            Self::Fargate => "fargate",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for ComputePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dispatch priority, 0 = critical .. 3 = low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Immediate attention (0).
    Critical,
    /// Elevated (1).
    High,
    /// Default (2).
    Normal,
    /// Background (3).
    Low,
}

impl Priority {
    /// Numeric level, 0 = critical .. 3 = low.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
        }
    }

    /// Get the display name for this priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static configuration row for one agent role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAssignment {
    /// Agent role this row belongs to.
    pub role: AgentRole,
    /// Human-readable agent name.
    pub display_name: String,
    /// Container image reference for the agent.
    pub image: String,
    /// Compute platform the agent runs on.
    pub platform: ComputePlatform,
    /// Dispatch priority.
    pub priority: Priority,
    /// Execution timeout in minutes.
    pub timeout_minutes: u32,
    /// Memory allocation in MiB.
    pub memory_mb: u32,
    /// CPU units (1024 = one vCPU).
    pub cpu_units: u32,
}

/// Errors raised while loading or validating an assignment table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Table file could not be read.
    #[error("failed to read assignment table {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Table file could not be parsed.
    #[error("failed to parse assignment table: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A known role has no row in the table.
    #[error("assignment table has no row for role '{0}'")]
    MissingRole(AgentRole),

    /// Two rows declare the same role.
    #[error("assignment table has duplicate rows for role '{0}'")]
    DuplicateRole(AgentRole),
}

/// Read-only role → assignment lookup table.
///
/// Construction validates totality: every `AgentRole` has exactly one
/// row, so lookups never fail and the classifier's output always
/// resolves.
#[derive(Debug, Clone)]
pub struct AssignmentTable {
    rows: BTreeMap<AgentRole, AgentAssignment>,
}

impl AssignmentTable {
    /// Build a table from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns an error if any role is missing or duplicated.
    pub fn new(rows: Vec<AgentAssignment>) -> Result<Self, TableError> {
        let mut map = BTreeMap::new();
        for row in rows {
            let role = row.role;
            if map.insert(role, row).is_some() {
                return Err(TableError::DuplicateRole(role));
            }
        }
        for role in AgentRole::ALL {
            if !map.contains_key(&role) {
                return Err(TableError::MissingRole(role));
            }
        }
        Ok(Self { rows: map })
    }

    /// Load a table from a YAML file (a sequence of assignment rows).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// totality validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let rows: Vec<AgentAssignment> = serde_yaml::from_str(&contents)?;
        let table = Self::new(rows)?;
        info!(
            path = %path.display(),
            rows = table.rows.len(),
            "Loaded assignment table"
        );
        Ok(table)
    }

    /// Look up the assignment for a role.
    #[must_use]
    pub fn get(&self, role: AgentRole) -> &AgentAssignment {
        // Totality is validated at construction, so every role resolves.
        &self.rows[&role]
    }

    /// Iterate over all rows in role order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentAssignment> {
        self.rows.values()
    }

    /// Number of rows (always the number of known roles).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty. Never true for a validated table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for AssignmentTable {
    /// Built-in assignment rows used when no table file is configured.
    fn default() -> Self {
        let rows = builtin_rows();
        Self {
            rows: rows.into_iter().map(|row| (row.role, row)).collect(),
        }
    }
}

fn builtin_rows() -> Vec<AgentAssignment> {
    fn row(
        role: AgentRole,
        display_name: &str,
        platform: ComputePlatform,
        priority: Priority,
        timeout_minutes: u32,
        memory_mb: u32,
        cpu_units: u32,
    ) -> AgentAssignment {
        AgentAssignment {
            role,
            display_name: display_name.to_string(),
            image: format!("ghcr.io/5dlabs/agents/{}:latest", role.as_str()),
            platform,
            priority,
            timeout_minutes,
            memory_mb,
            cpu_units,
        }
    }

    use AgentRole as R;
    use ComputePlatform as P;
    vec![
        row(R::Developer, "Developer Agent", P::Fargate, Priority::High, 60, 2048, 1024),
        row(R::Frontend, "Frontend Agent", P::Fargate, Priority::Normal, 45, 2048, 1024),
        row(R::Security, "Security Agent", P::Fargate, Priority::Critical, 90, 4096, 2048),
        row(R::Devops, "DevOps Agent", P::Batch, Priority::High, 120, 4096, 2048),
        row(R::Qa, "QA Agent", P::Batch, Priority::Normal, 180, 8192, 4096),
        row(R::Docs, "Docs Agent", P::Lambda, Priority::Low, 15, 512, 256),
        row(R::Support, "Support Agent", P::Lambda, Priority::Normal, 15, 512, 256),
    ]
}
