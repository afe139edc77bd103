//! Relay gateway binary.
//!
//! Standalone HTTP service for GitHub issue webhook handling.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use compute::Dispatcher;
use dispatch::AssignmentTable;
use gateway::{build_router, AppState, Config, GitHubClient, Notifier};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("gateway=info".parse()?))
        .init();

    info!("Starting Relay gateway...");

    // Load configuration
    let config = Config::default();

    if !config.enabled {
        warn!("RELAY_ENABLED is set to false. Service will not process webhooks.");
    }

    // Load the assignment table
    let table = match &config.assignment_table_path {
        Some(path) => AssignmentTable::load(path)
            .with_context(|| format!("Failed to load assignment table from {path}"))?,
        None => {
            info!("No RELAY_ASSIGNMENTS configured - using built-in assignment table");
            AssignmentTable::default()
        }
    };
    info!(rows = table.len(), "Assignment table ready");

    // Build the compute dispatcher
    let dispatcher = Dispatcher::from_config(config.compute.clone())
        .context("Failed to create compute dispatcher")?;
    info!(region = %config.compute.region, "Compute dispatcher configured");

    // Build the notifier if a GitHub token is configured
    let notifier = if let Some(token) = &config.github_token {
        let github = match &config.github_api_url {
            Some(base_url) => GitHubClient::with_base_url(token, base_url),
            None => GitHubClient::new(token),
        }
        .context("Failed to create GitHub client")?;
        info!("GitHub notifier configured");
        Some(Arc::new(Notifier::new(github)))
    } else {
        warn!("No GITHUB_TOKEN configured - assignment comments and labels are disabled");
        None
    };

    // Build application state
    let state = AppState {
        config: config.clone(),
        table: Arc::new(table),
        dispatcher: Arc::new(dispatcher),
        notifier,
    };

    // Build router
    let app = build_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port = config.port, "Relay gateway listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
