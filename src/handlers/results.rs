use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;

use crate::errors::{AppError, Result};
use crate::models::match_result::{MatchResult, SaveMatchResult};
use crate::models::user::Session;
use crate::services::results::MatchResultEditor;
use crate::AppState;

pub async fn get_result(
    State(state): State<AppState>,
    _session: Session,
    Path(event_id): Path<String>,
) -> Result<Json<MatchResult>> {
    let result = MatchResultEditor::new(state.store.clone())
        .get(&event_id)
        .await?
        .ok_or(AppError::NotFound("result"))?;
    Ok(Json(result))
}

pub async fn save_result(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<String>,
    Json(payload): Json<SaveMatchResult>,
) -> Result<Json<MatchResult>> {
    session.require_admin()?;
    let result = MatchResultEditor::new(state.store.clone())
        .save(&event_id, payload, Utc::now())
        .await?;
    Ok(Json(result))
}

// Admin teardown of a played match: event, votes and result disappear
// together. Stats keep whatever the match contributed; reprocessing is the
// way to rebuild them.
pub async fn delete_match(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    session.require_admin()?;
    MatchResultEditor::new(state.store.clone())
        .delete_match(&event_id)
        .await?;
    Ok(Json(serde_json::json!({ "deleted": event_id })))
}
