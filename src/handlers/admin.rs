use axum::extract::State;
use axum::response::Json;
use chrono::Utc;
use serde_json::json;

use crate::errors::Result;
use crate::models::user::Session;
use crate::services::archival::ArchivalEngine;
use crate::AppState;

// On-demand archival pass, for when an admin does not want to wait for the
// scheduler or the next page load.
pub async fn run_archival(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<serde_json::Value>> {
    session.require_admin()?;
    let archived = ArchivalEngine::new(state.store.clone()).run(Utc::now()).await;
    Ok(Json(json!({ "archived": archived })))
}
