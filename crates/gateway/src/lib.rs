//! GitHub issue intake and agent dispatch service.
//!
//! This crate provides:
//! - HTTP server for GitHub issue webhooks (standalone service)
//! - Webhook signature verification (`X-Hub-Signature-256`)
//! - The dispatch pipeline: classify → assign → dispatch → notify
//! - GitHub REST client for assignment comments and labels

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Many async API methods can fail

pub mod config;
pub mod github;
pub mod handlers;
pub mod notifier;
pub mod server;
pub mod webhooks;

pub use config::Config;
pub use github::GitHubClient;
pub use notifier::{Notifier, NotifyError, NotifyReceipt};
pub use server::{build_router, AppState};
pub use webhooks::{verify_webhook_signature, WebhookHeaders};
