use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::SubjectListing;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness probe for uptime monitors.
pub async fn index() -> &'static str {
    "exam-archive is running"
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_subjects(State(state): State<Arc<AppState>>) -> Json<SubjectListing> {
    Json(state.catalog.list_subjects())
}

pub async fn list_options(
    State(state): State<Arc<AppState>>,
    Path(subject): Path<String>,
) -> Json<Vec<String>> {
    Json(state.catalog.list_options(&subject))
}

pub async fn list_years(
    State(state): State<Arc<AppState>>,
    Path((subject, exam_type)): Path<(String, String)>,
) -> Json<Vec<String>> {
    Json(state.catalog.list_years(&subject, &exam_type))
}
