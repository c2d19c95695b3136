//! Extraction API routes
//!
//! Endpoints:
//! - POST /api/documents/:id/extract - Match rules remotely and highlight
//! - POST /api/documents/:id/reset - Restore the pristine rendering

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::session::SessionSummary;
use crate::state::AppState;

/// Create the extraction router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/extract", post(extract))
        .route("/:id/reset", post(reset))
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub applied: usize,
    pub per_rule: Vec<usize>,
    pub html: String,
}

/// POST /api/documents/:id/extract
///
/// Every rule is sent each time; the result replaces any earlier highlights.
async fn extract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExtractResponse>> {
    let outcome = state.sessions().extract(id, state.matcher()).await?;

    Ok(Json(ExtractResponse {
        applied: outcome.applied,
        per_rule: outcome.per_rule,
        html: outcome.html,
    }))
}

/// POST /api/documents/:id/reset
async fn reset(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionSummary>> {
    let sessions = state.sessions();
    sessions.reset(id).await?;
    Ok(Json(sessions.summary(id).await?))
}
