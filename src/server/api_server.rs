//! API server setup

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::data::ServerConfig;
use crate::server::handlers::{convert, status, AppState};
use crate::server::types::{CONVERT_PATH, STATUS_PATH};

/// Build the API router
pub fn router(state: Arc<AppState>, cors: bool) -> Router {
    let mut app = Router::new()
        .route(STATUS_PATH, get(status))
        .route(CONVERT_PATH, post(convert))
        .layer(TraceLayer::new_for_http());

    if cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn start_api_server(config: &ServerConfig, state: Arc<AppState>) -> Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Voice Sheet API listening on http://{}", addr);

    axum::serve(listener, router(state, config.cors))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await
        .context("API server error")?;

    Ok(())
}
