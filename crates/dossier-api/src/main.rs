//! Dossier API Server
//!
//! REST API server for the batch document-intelligence pipeline.

use std::sync::Arc;

use dossier_api::{create_router, state::AppState};
use dossier_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dossier_api=debug,dossier_batch=debug,tower_http=debug".into()),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(model = %config.llm.model, "using inference model");

    // Create application state
    let state = Arc::new(AppState::new(config)?);

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Dossier API server starting on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
