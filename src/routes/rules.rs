//! Highlight rule API routes
//!
//! Endpoints:
//! - GET /api/documents/:id/rules - List rules in order
//! - POST /api/documents/:id/rules - Add a rule
//! - DELETE /api/documents/:id/rules/:index - Remove a rule and re-highlight
//! - PUT /api/documents/:id/color - Pick the colour for the next rule

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::rules::HighlightRule;
use crate::session::{AddedRule, RemoveOutcome};
use crate::state::AppState;

/// Create the rules router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/rules", get(list_rules).post(add_rule))
        .route("/:id/rules/:index", delete(remove_rule))
        .route("/:id/color", put(select_color))
}

#[derive(Debug, Deserialize)]
pub struct AddRuleRequest {
    pub description: String,
    /// Falls back to the currently selected colour
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectColorRequest {
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct SelectColorResponse {
    pub selected_color: String,
}

/// GET /api/documents/:id/rules
async fn list_rules(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HighlightRule>>> {
    Ok(Json(state.sessions().rules(id).await?))
}

/// POST /api/documents/:id/rules
///
/// Adding a rule does not touch the rendering; highlights are rebuilt on the
/// next extract.
async fn add_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddRuleRequest>,
) -> Result<(StatusCode, Json<AddedRule>)> {
    let added = state
        .sessions()
        .add_rule(id, &request.description, request.color.as_deref())
        .await?;

    tracing::debug!(
        document_id = %id,
        index = added.index,
        color = %added.rule.color,
        "Rule added: {}",
        added.rule.description
    );

    Ok((StatusCode::CREATED, Json(added)))
}

/// DELETE /api/documents/:id/rules/:index
async fn remove_rule(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<RemoveOutcome>> {
    let outcome = state
        .sessions()
        .remove_rule(id, index, state.matcher())
        .await?;

    tracing::debug!(
        document_id = %id,
        index,
        rehighlight = ?outcome.rehighlight,
        "Rule removed"
    );

    Ok(Json(outcome))
}

/// PUT /api/documents/:id/color
async fn select_color(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectColorRequest>,
) -> Result<Json<SelectColorResponse>> {
    let selected_color = state.sessions().select_color(id, &request.color).await?;
    Ok(Json(SelectColorResponse { selected_color }))
}
