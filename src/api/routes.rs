use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness
        .route("/", get(handlers::index))
        // Catalog
        .route("/subjects", get(handlers::list_subjects))
        .route("/options/:subject", get(handlers::list_options))
        .route("/years/:subject/:exam_type", get(handlers::list_years))
        // Downloads
        .route("/download", post(handlers::download))
        .route("/download-url/:filename", get(handlers::download_by_name))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
