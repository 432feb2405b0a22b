pub mod page;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tracing::info;

use crate::config::DetectorConfig;
use crate::detection::yolo::YoloDetector;
use crate::render::Annotator;
pub use state::WebState;

/// Largest upload accepted by the detect endpoints
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/detect", post(routes::detect_page))
        .route("/api/detect", post(routes::detect_json))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Load the model, then serve the upload form until the process is stopped
pub async fn serve(config: DetectorConfig, bind: &str) -> anyhow::Result<()> {
    let annotator = Annotator::from_config(&config)?;
    let detector = tokio::task::spawn_blocking(move || YoloDetector::load(&config))
        .await?
        .context("Failed to load detection model")?;

    let app = router(WebState::new(Arc::new(detector), annotator));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("AstroGuard web front-end listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
