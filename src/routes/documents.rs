//! Document API routes
//!
//! Endpoints:
//! - POST /api/documents - Upload a PDF, DOCX or TXT file
//! - GET /api/documents - List open documents
//! - GET /api/documents/:id - Document session summary
//! - DELETE /api/documents/:id - Clear the document selection
//! - GET /api/documents/:id/html - Current HTML rendering
//! - GET /api/documents/:id/text - Plain-text rendering
//! - GET /api/documents/:id/raw - Original upload bytes

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::document::{load_document_with_limit, DocumentError};
use crate::error::{AppError, Result};
use crate::session::SessionSummary;
use crate::state::AppState;

/// Create the documents router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_documents).post(upload_document))
        .route("/:id", get(get_document).delete(delete_document))
        .route("/:id/html", get(get_html))
        .route("/:id/text", get(get_text))
        .route("/:id/raw", get(get_raw))
}

/// POST /api/documents
///
/// Accepts a multipart body with a `file` (or `document`) field. Replaces
/// nothing: each upload opens a new session.
async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SessionSummary>)> {
    let max = state.config().documents.max_upload_bytes;
    let max_expanded = state.config().documents.max_expanded_bytes;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" && name != "document" {
            tracing::debug!("Ignoring multipart field '{}'", name);
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::BadRequest("Upload is missing a file name".to_string()))?;
        let bytes = field.bytes().await?;

        if bytes.len() > max {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                max,
            }
            .into());
        }

        tracing::info!(file_name = %file_name, size = bytes.len(), "Loading uploaded document");

        let document = tokio::task::spawn_blocking(move || {
            load_document_with_limit(&file_name, bytes.to_vec(), max_expanded)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Conversion task failed: {}", e)))??;

        let summary = state.sessions().insert(document).await;
        tracing::info!(
            document_id = %summary.id,
            format = %summary.format,
            "Document session opened"
        );

        return Ok((StatusCode::CREATED, Json(summary)));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}

/// GET /api/documents
async fn list_documents(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    Json(state.sessions().list().await)
}

/// GET /api/documents/:id
async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>> {
    Ok(Json(state.sessions().summary(id).await?))
}

/// DELETE /api/documents/:id
async fn delete_document(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.sessions().remove(id).await?;
    tracing::info!(document_id = %id, "Document session cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/documents/:id/html
///
/// The highlighted rendering when one exists, otherwise the pristine one.
async fn get_html(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Html<String>> {
    Ok(Html(state.sessions().current_html(id).await?))
}

/// GET /api/documents/:id/text
async fn get_text(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let text = state.sessions().plain_text(id).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}

/// GET /api/documents/:id/raw
///
/// PDFs are displayed by the browser's own viewer from this endpoint.
async fn get_raw(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let source = state.sessions().source(id).await?;
    let disposition = format!(
        "inline; filename=\"{}\"",
        source.file_name.replace(['"', '\\', '\r', '\n'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, source.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        source.bytes,
    )
        .into_response())
}
