use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::api::response::{ApiError, AppJson};
use crate::asset_store::{Asset, AssetStoreError};
use crate::catalog::resolve_filename;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub exam_type: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Resolve a catalog triple to its PDF and stream it back.
/// Route: POST /download
pub async fn download(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<DownloadRequest>,
) -> Result<Response, ApiError> {
    let subject = required_field(req.subject.as_deref(), "subject")?;
    let exam_type = required_field(req.exam_type.as_deref(), "exam_type")?;
    let year = req.year.as_deref().unwrap_or("").trim();
    let user = req
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or("unknown");

    let filename = resolve_filename(subject, exam_type, year);
    let asset = fetch_or_not_found(&state, &filename).await?;

    // A failed append is an operator problem, not the caller's; the
    // download itself still succeeds.
    if let Err(e) = state
        .download_log
        .record(user, subject, exam_type, year)
        .await
    {
        tracing::error!(error = %e, filename = %filename, "Failed to record download");
    }

    tracing::debug!(filename = %filename, user = %user, "Served download");
    Ok(attachment_response(asset, &filename, "application/pdf"))
}

/// Serve an asset by its literal filename, bypassing the resolver.
/// Route: GET /download-url/:filename
pub async fn download_by_name(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let asset = fetch_or_not_found(&state, &filename).await?;

    let mime = mime_guess::from_path(&filename).first_or(mime_guess::mime::APPLICATION_PDF);
    Ok(attachment_response(asset, &filename, mime.as_ref()))
}

// ============================================================================
// Helpers
// ============================================================================

fn required_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{name} field is required")))
}

async fn fetch_or_not_found(state: &AppState, filename: &str) -> Result<Asset, ApiError> {
    state.assets.fetch(filename).await.map_err(|e| match e {
        AssetStoreError::NotFound(_) => ApiError::not_found(format!("PDF '{filename}' not found")),
        _ => ApiError::internal(format!("Failed to read asset: {e}")),
    })
}

fn attachment_response(asset: Asset, filename: &str, content_type: &str) -> Response {
    let stream = ReaderStream::new(asset.file);
    let mut response = (StatusCode::OK, Body::from_stream(stream)).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        content_type
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/pdf")),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        header::HeaderValue::from(asset.byte_size),
    );

    if let Ok(value) = format!("attachment; filename=\"{filename}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    response
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_state;
    use axum::body::to_bytes;

    fn request(subject: Option<&str>, exam_type: Option<&str>) -> DownloadRequest {
        DownloadRequest {
            subject: subject.map(String::from),
            exam_type: exam_type.map(String::from),
            year: None,
            user_id: None,
        }
    }

    fn write_asset(state: &AppState, name: &str, contents: &[u8]) {
        let path = std::path::Path::new(&state.config.assets.directory).join(name);
        std::fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn download_streams_file_and_appends_one_log_row() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        write_asset(&state, "physics_unit3.pdf", b"%PDF-1.4 unit3");

        let response = download(
            State(Arc::clone(&state)),
            AppJson(request(Some("physics"), Some("unit3"))),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"%PDF-1.4 unit3");

        let log = std::fs::read_to_string(state.download_log.path()).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Timestamp,User,Subject,ExamType,Year");
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(&fields[1..], &["unknown", "physics", "unit3", ""]);
    }

    #[tokio::test]
    async fn download_missing_asset_is_not_found_and_unlogged() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let result = download(
            State(Arc::clone(&state)),
            AppJson(request(Some("physics_lab1"), Some("material"))),
        )
        .await;

        match result {
            Err(ApiError::Fail(code, message)) => {
                assert_eq!(code, StatusCode::NOT_FOUND);
                assert!(message.contains("physics_lab1_material.pdf"));
            }
            other => panic!("expected 404, got {other:?}"),
        }
        assert!(!state.download_log.path().exists());
    }

    #[tokio::test]
    async fn download_without_subject_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let result = download(State(state), AppJson(request(None, Some("unit1")))).await;

        match result {
            Err(ApiError::Fail(code, message)) => {
                assert_eq!(code, StatusCode::BAD_REQUEST);
                assert!(message.contains("subject"));
            }
            other => panic!("expected 400, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn download_records_user_and_year_for_dated_exams() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        write_asset(&state, "physics_end_sem_2024.pdf", b"%PDF-1.4 end_sem");

        let req = DownloadRequest {
            subject: Some("physics".into()),
            exam_type: Some("end_sem".into()),
            year: Some("2024".into()),
            user_id: Some("alice".into()),
        };
        download(State(Arc::clone(&state)), AppJson(req))
            .await
            .unwrap();

        let log = std::fs::read_to_string(state.download_log.path()).unwrap();
        let row = log.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(&fields[1..], &["alice", "physics", "end_sem", "2024"]);
    }

    #[tokio::test]
    async fn download_by_name_serves_literal_filename() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        write_asset(&state, "workshop_material.pdf", b"%PDF-1.4 workshop");

        let response = download_by_name(
            State(Arc::clone(&state)),
            Path("workshop_material.pdf".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"%PDF-1.4 workshop");
        // Literal downloads bypass the resolver and are not logged.
        assert!(!state.download_log.path().exists());
    }

    #[tokio::test]
    async fn download_by_name_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        // A real file one level above the asset root.
        std::fs::write(dir.path().join("secret.pdf"), b"top secret").unwrap();

        let result = download_by_name(
            State(state),
            Path("../secret.pdf".to_string()),
        )
        .await;

        match result {
            Err(ApiError::Fail(code, _)) => assert_eq!(code, StatusCode::NOT_FOUND),
            other => panic!("expected 404, got {other:?}"),
        }
    }
}
