use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, extract::DefaultBodyLimit};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState, SharedState};
use crate::db::{DbHandle, HubDb};
use crate::hub_config::HubConfig;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the full application router: API routes, static uploads, tracing.
pub fn build_router(state: SharedState) -> Router {
    let upload_dir = state.config.server.upload_dir.clone();
    let body_limit = state.config.uploads.max_bytes.saturating_add(MULTIPART_OVERHEAD);
    let dev_mode = state.config.server.dev_mode;

    let mut app = api::api_router()
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if dev_mode {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

/// Open the database, creating its parent directory, and run migrations.
pub fn open_database(config: &HubConfig) -> Result<HubDb> {
    if let Some(parent) = config.server.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
    }
    HubDb::new(&config.server.db_path).context("Failed to initialize database")
}

/// Start the HTTP server and run until Ctrl+C.
pub async fn start_server(config: HubConfig, jwt_secret: &str) -> Result<()> {
    let db = open_database(&config)?;
    std::fs::create_dir_all(&config.server.upload_dir).with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.server.upload_dir.display()
        )
    })?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(DbHandle::new(db), config, jwt_secret));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, "creatorhub listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
