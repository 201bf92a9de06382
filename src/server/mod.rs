//! HTTP service: upload a document, then split its converted PDF.
//!
//! - `POST /upload` (multipart field `file`) converts the document and returns its page
//!   count with a session token
//! - `POST /process` splits the converted PDF into the requested files and removes the
//!   session's temp files

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::convert::Converter;
use crate::session::SessionStore;

mod error;
mod handlers;
mod models;

/// Shared application state
pub struct AppState {
    pub sessions: SessionStore,
    pub converter: Converter,
}

pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload))
        .route("/process", post(handlers::process))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState {
        sessions: SessionStore::new(&config.temp_dir),
        converter: Converter::with_defaults(&config.converter),
    });
    info!(
        temp_dir = %config.temp_dir.display(),
        strategies = ?state.converter.strategy_names(),
        max_upload_bytes = config.max_upload_bytes,
        "initialized"
    );

    let app = router(state, config.max_upload_bytes);

    info!("Starting docsplit on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
