use axum::extract::State;
use axum::response::Json;
use chrono::Utc;
use serde_json::json;

use crate::errors::Result;
use crate::models::stats::PlayerStats;
use crate::models::user::Session;
use crate::services::aggregation::StatsEngine;
use crate::AppState;

pub async fn get_stats(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<PlayerStats>>> {
    let stats = StatsEngine::new(state.store.clone()).all_stats().await?;
    Ok(Json(stats))
}

// Full rebuild of goal/assist/card/figure counters from every stored match
// result. Manual repair tool, safe to run as often as needed.
pub async fn reprocess(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<serde_json::Value>> {
    session.require_admin()?;
    let players = StatsEngine::new(state.store.clone())
        .reprocess_results(Utc::now())
        .await?;
    tracing::info!("reprocessed match results for {} player(s)", players);
    Ok(Json(json!({ "playersUpdated": players })))
}

// Full rebuild of the attendance counters from the archive.
pub async fn recalculate(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<serde_json::Value>> {
    session.require_admin()?;
    let players = StatsEngine::new(state.store.clone())
        .recalculate_attendance(Utc::now())
        .await?;
    tracing::info!("recalculated attendance for {} player(s)", players);
    Ok(Json(json!({ "playersUpdated": players })))
}
