// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::{
    kernel::{start_scheduler, ServerDeps},
    server::build_app,
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,pipeline=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting collection pipeline API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Stores, generator, researcher and fetcher
    let deps = Arc::new(
        ServerDeps::from_config(&config)
            .await
            .context("Failed to initialize dependencies")?,
    );
    tracing::info!(backend = deps.backend.as_str(), "Dependencies ready");

    // Research sweep; the scheduler must outlive the server
    let _scheduler = start_scheduler(deps.clone(), &config.research_sweep_cron)
        .await
        .context("Failed to start scheduled tasks")?;

    // Build application
    let app = build_app(deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Tools: http://localhost:{}/tools", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
