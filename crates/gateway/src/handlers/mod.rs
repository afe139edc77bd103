//! HTTP handlers for the Relay gateway.

pub mod issues;

pub use issues::{handle_issue_webhook, run_pipeline};
