//! Core dispatch domain for the Relay platform.
//!
//! This crate provides:
//! - Serde models for inbound GitHub issue webhook events
//! - The classifier mapping an issue to exactly one agent role
//! - The static role → compute assignment table (with YAML overrides)
//! - Result types for the dispatch pipeline
//!
//! Everything here is pure — no I/O beyond loading the assignment table
//! file. The HTTP surface lives in the `gateway` crate and the compute
//! backends in the `compute` crate.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assignment;
pub mod classify;
pub mod event;
pub mod result;

pub use assignment::{
    AgentAssignment, AgentRole, AssignmentTable, ComputePlatform, Priority, TableError,
};
pub use classify::classify;
pub use event::{Issue, IssueAction, IssueEvent, IssueLabel, Repository, Sender};
pub use result::{NotificationOutcome, TriageResult};
